#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use evoked_linalg as linalg;

#[doc(inline)]
pub use evoked_store as store;

#[doc(inline)]
pub use evoked_score as score;

#[doc(inline)]
pub use evoked_ssvep as ssvep;

#[doc(inline)]
pub use evoked_io as io;
