//! Database entities

pub mod medical_record;
pub mod organ_match;
pub mod organ_pledge;
pub mod organ_request;
pub mod user;

pub use medical_record::Entity as MedicalRecord;
pub use organ_match::Entity as OrganMatch;
pub use organ_pledge::Entity as OrganPledge;
pub use organ_request::Entity as OrganRequest;
pub use user::Entity as User;
