mod conformance;
mod pipeline;
mod transactions;
