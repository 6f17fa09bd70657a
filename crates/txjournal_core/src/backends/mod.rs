//! Journal implementations for each phase of the instance lifecycle.
//!
//! | journal | kind | result |
//! |---|---|---|
//! | [`NoWriteJournal`] | unset | rejects every entry |
//! | [`BootstrapJournal`] | bootstrap | always 0 |
//! | [`RecoveryJournal`] | recovery | LSN already carried by the rows |
//! | [`CounterJournal`] | disabled | in-memory counter |
//! | [`LiveJournal`] | live | LSN assigned by the writer thread |
//!
//! All but the live journal complete entries before `write_async` returns.

mod bootstrap;
mod counter;
mod live;
mod no_write;
mod recovery;

pub use bootstrap::BootstrapJournal;
pub use counter::CounterJournal;
pub use live::LiveJournal;
pub use no_write::NoWriteJournal;
pub use recovery::RecoveryJournal;
