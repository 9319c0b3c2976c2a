// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod detail;
pub mod error;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod state;
pub mod store;
pub mod sync;
pub mod view;

pub use detail::*;
pub use error::*;
pub use ids::*;
pub use model::*;
pub use pagination::*;
pub use state::*;
pub use store::*;
pub use sync::*;
pub use view::*;
