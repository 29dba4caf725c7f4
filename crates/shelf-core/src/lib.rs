//! # shelf-core
//!
//! Types shared by every Shelf crate: the product and user records, the form
//! payloads with their structural validation, and the YAML configuration.

pub mod config;
pub mod forms;
pub mod models;

pub use config::{ConfigError, ShelfConfig};
pub use forms::{AjaxProductForm, FormErrors, LoginForm, NewAccount, ProductForm, RegistrationForm};
pub use models::{Price, Product, ProductFields, ProductId, User, UserId};
