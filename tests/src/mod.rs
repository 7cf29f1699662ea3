#[cfg(test)]
pub mod client_query_tests;
#[cfg(test)]
pub mod profile_update_tests;
#[cfg(test)]
pub mod reservation_flow_tests;
#[cfg(test)]
pub mod transaction_flow_tests;
#[cfg(test)]
pub mod utils;
