/*!
Topology module

This module holds the mesh link state the window displays and the logic that keeps it current.

Structure:
- `table`: `DisplayTable`, the sorted link rows, and the merge rules for a poll result.
- `scheduler`: `PollScheduler`, deciding when a poll is due (button, auto-update timer).
- `status`: `MeshStatus`, tying parser, resolver, table and scheduler together.
*/

pub mod scheduler;
pub mod status;
pub mod table;

pub use scheduler::PollReason;
pub use status::{CycleHealth, MeshStatus};
pub use table::{LinkColumn, LinkRow, RowRenderer};
