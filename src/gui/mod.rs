/*
 * Desktop front-end: the mesh status window and the bridge that runs polls
 * on the tokio runtime for it.
 */

pub mod app;
pub mod poller;
