pub mod contract;
pub mod fees;
pub mod msg;
pub mod price;
pub mod state;
