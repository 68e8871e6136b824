pub mod args;
mod convert;
mod remap;
mod utils;
mod verify;
mod visualize;
