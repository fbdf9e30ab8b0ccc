pub mod source;
pub mod updater;

pub use source::{
    load_examples,
    ExampleMap,
    ExampleRecord,
};
pub use updater::{
    ExampleUpdater,
    UpdateSummary,
};
