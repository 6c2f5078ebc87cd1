pub mod builder;
pub mod credentials;
pub mod distance_matrix;
pub mod error;
pub mod geocoder;
pub mod instance;
pub mod location_table;
pub mod node;
pub mod traffic;
pub mod validator;
