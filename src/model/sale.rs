use serde_json::Value as JsnVal;

pub const EVENT_ORDER_PAID: &str = "order.paid";
const DEFAULT_SALE_QUANTITY: u32 = 1;

/// Sale confirmed by the payment gateway, recovered from the notes attached
/// to the remote order at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleEventModel {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WebhookIgnoreReason {
    CorruptedPayload(String),
    UnhandledEvent(String),
    MissingNotes,
    MissingProductId,
    InvalidProductId(String),
    InvalidQuantity(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum WebhookRouteDecision {
    Ignored(WebhookIgnoreReason),
    Dispatched(SaleEventModel),
}

impl SaleEventModel {
    pub fn new(product_id: u64, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    fn parse_id(raw: &JsnVal) -> Result<u64, WebhookIgnoreReason> {
        let parsed = match raw {
            JsnVal::String(s) => s.trim().parse::<u64>().ok(),
            JsnVal::Number(n) => n.as_u64(),
            _others => None,
        };
        parsed.ok_or_else(|| WebhookIgnoreReason::InvalidProductId(raw.to_string()))
    }

    fn parse_quantity(raw: Option<&JsnVal>) -> Result<u32, WebhookIgnoreReason> {
        let raw = match raw {
            Some(v) => v,
            None => return Ok(DEFAULT_SALE_QUANTITY),
        };
        let parsed = match raw {
            JsnVal::String(s) => s.trim().parse::<u32>().ok(),
            JsnVal::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            _others => None,
        };
        match parsed {
            Some(q) if q > 0 => Ok(q),
            _others => Err(WebhookIgnoreReason::InvalidQuantity(raw.to_string())),
        }
    }

    fn try_from_notes(notes: &JsnVal) -> Result<Self, WebhookIgnoreReason> {
        let notes = notes.as_object().ok_or(WebhookIgnoreReason::MissingNotes)?;
        let product_id = notes
            .get("product_id")
            .ok_or(WebhookIgnoreReason::MissingProductId)
            .and_then(Self::parse_id)?;
        let quantity = Self::parse_quantity(notes.get("quantity"))?;
        Ok(Self::new(product_id, quantity))
    }
} // end of impl SaleEventModel

impl WebhookRouteDecision {
    /// Route a webhook body whose signature has already been verified.
    pub fn from_verified(raw: &[u8]) -> Self {
        let jsn = match serde_json::from_slice::<JsnVal>(raw) {
            Ok(v) => v,
            Err(e) => {
                return Self::Ignored(WebhookIgnoreReason::CorruptedPayload(e.to_string()));
            }
        };
        let event = match jsn.get("event").and_then(JsnVal::as_str) {
            Some(v) => v,
            None => {
                let reason = WebhookIgnoreReason::CorruptedPayload("missing-event".to_string());
                return Self::Ignored(reason);
            }
        };
        if event != EVENT_ORDER_PAID {
            return Self::Ignored(WebhookIgnoreReason::UnhandledEvent(event.to_string()));
        }
        let notes = jsn
            .pointer("/payload/order/entity/notes")
            .ok_or(WebhookIgnoreReason::MissingNotes)
            .and_then(SaleEventModel::try_from_notes);
        match notes {
            Ok(sale) => Self::Dispatched(sale),
            Err(reason) => Self::Ignored(reason),
        }
    }
}
