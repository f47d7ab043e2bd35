//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod automation_rule_repo;
pub mod campaign_repo;
pub mod coupon_repo;
pub mod customer_repo;
pub mod execution_log_repo;
pub mod loyalty_repo;
pub mod message_delivery_repo;
pub mod notification_repo;
pub mod offer_repo;
pub mod segment_membership_repo;
pub mod segment_repo;

pub use automation_rule_repo::AutomationRuleRepo;
pub use campaign_repo::CampaignRepo;
pub use coupon_repo::CouponRepo;
pub use customer_repo::CustomerRepo;
pub use execution_log_repo::ExecutionLogRepo;
pub use loyalty_repo::{LoyaltyAdjustError, LoyaltyRepo};
pub use message_delivery_repo::MessageDeliveryRepo;
pub use notification_repo::NotificationRepo;
pub use offer_repo::OfferRepo;
pub use segment_membership_repo::SegmentMembershipRepo;
pub use segment_repo::SegmentRepo;
