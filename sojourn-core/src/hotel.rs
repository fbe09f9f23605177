use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable property. Created out-of-band (admin surface); immutable
/// within the booking workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub price_per_night: Decimal,
    pub image_url: String,
}

impl Hotel {
    pub fn new(
        name: String,
        location: String,
        description: String,
        price_per_night: Decimal,
        image_url: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            location,
            description,
            price_per_night,
            image_url,
        }
    }
}
