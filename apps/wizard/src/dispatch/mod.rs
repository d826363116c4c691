// Mutation Dispatcher: the single serialized channel for DocumentModel edits.
// Forms never touch the model directly; they submit a Mutation and observe
// the new model reference.

pub mod dispatcher;
pub mod mutation;

pub use dispatcher::{DispatchReceipt, MutationDispatcher};
pub use mutation::DispatchError;
