pub mod clash;

pub use clash::ClashProxy;
