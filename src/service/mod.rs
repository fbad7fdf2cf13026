pub mod attendance;
pub mod auto_checkout;
pub mod ledger;
