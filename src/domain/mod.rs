//! Domain types shared by the services, stores and HTTP layer.

use chrono::{DateTime, SubsecRound, Utc};

mod money;
mod order;
mod product;
mod user;

pub use money::Money;
pub use order::{CartLine, DraftLine, Order, OrderDraft, OrderLine, OrderStatus, UnknownStatus};
pub use product::{ActiveFilter, Product, ProductCreate, ProductFilter, ProductUpdate};
pub use user::{Capability, CapabilitySet, Role, UnknownRole, User};

/// Current time at the precision storage keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
