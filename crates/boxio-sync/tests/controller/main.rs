//! Controller tests for boxio-sync
//!
//! Runs the listen and upload loops against an in-memory folder and a
//! sleeper that never actually waits.


mod test_upload;
