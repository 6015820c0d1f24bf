pub mod error;
pub mod negotiate;
pub mod routes;
