//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod delivery_assignment;
pub mod delivery_location;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod order_status_history;
pub mod restaurant;
pub mod review;
pub mod status;
pub mod user;

// Re-export specific types to avoid conflicts
pub use delivery_assignment::{
    Column as DeliveryAssignmentColumn, Entity as DeliveryAssignment,
    Model as DeliveryAssignmentModel,
};
pub use delivery_location::{
    Column as DeliveryLocationColumn, Entity as DeliveryLocation, Model as DeliveryLocationModel,
};
pub use menu_item::{Column as MenuItemColumn, Entity as MenuItem, Model as MenuItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use order_status_history::{
    Column as OrderStatusHistoryColumn, Entity as OrderStatusHistory,
    Model as OrderStatusHistoryModel,
};
pub use restaurant::{Column as RestaurantColumn, Entity as Restaurant, Model as RestaurantModel};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use status::{
    DeliveryStatus, MenuCategory, OrderStatus, PaymentMethod, RestaurantStatus, UserRole,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
