use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{integer, number, text, text_or_empty};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Fulfillment status. `SHIPPED` and `CONFIRMED` are accepted as `DELIVERY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    #[serde(alias = "SHIPPED", alias = "CONFIRMED")]
    Delivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Delivery => "DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Case-insensitive parse.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "DELIVERY" | "SHIPPED" | "CONFIRMED" => Some(Self::Delivery),
            "DELIVERED" => Some(Self::Delivered),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Statuses an operator may move an order to from this one.
    pub fn selectable_next(&self) -> &'static [OrderStatus] {
        match self {
            Self::Pending | Self::Processing => &[Self::Delivery, Self::Delivered, Self::Cancelled],
            Self::Delivery => &[Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Order record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub sku: String,
    pub price: f64,
    pub stock: i64,
    pub color: Option<String>,
    pub size: Option<String>,
    pub product_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub quantity: i64,
    pub price: f64,
    pub variant: Variant,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub placed_at: String,
    pub items: Vec<OrderItem>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
    pub customer: Option<Customer>,
    pub shipping_address: Option<ShippingAddress>,
    pub updated_at: Option<String>,
}

impl Order {
    /// Minimal record; used by tests and by callers that build orders locally.
    pub fn new(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            total_amount: 0.0,
            placed_at: String::new(),
            items: Vec::new(),
            payment_status: None,
            payment_method: None,
            user_id: None,
            notes: None,
            customer: None,
            shipping_address: None,
            updated_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Partial payload mapping
// ---------------------------------------------------------------------------

/// Map a partial order payload into a full [`Order`].
///
/// Returns `None` only when there is no usable `id`. Other defaults:
/// unknown or missing `status` is `PENDING`, amounts are 0, `placedAt`
/// falls back to `createdAt` then `""`, items without a variant get an
/// empty one (its id taken from `variantId` when present). The buyer comes
/// from `user`, else `customer`.
pub fn order_from_payload(v: &Value) -> Option<Order> {
    let id = text(v, "id").or_else(|| text(v, "orderId")).filter(|s| !s.is_empty())?;

    let status = match text(v, "status") {
        Some(raw) => OrderStatus::parse(&raw).unwrap_or_else(|| {
            warn!(order_id = %id, status = %raw, "unknown order status, treating as PENDING");
            OrderStatus::Pending
        }),
        None => OrderStatus::Pending,
    };

    let items = v
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(item_from_payload).collect())
        .unwrap_or_default();

    let customer = v
        .get("user")
        .filter(|c| c.is_object())
        .or_else(|| v.get("customer").filter(|c| c.is_object()))
        .map(|c| Customer {
            first_name: text(c, "firstName")
                .or_else(|| text(c, "name"))
                .unwrap_or_default(),
            last_name: text_or_empty(c, "lastName"),
            email: text_or_empty(c, "email"),
            phone: text_or_empty(c, "phone"),
        });

    let shipping_address = v
        .get("shippingAddress")
        .filter(|a| a.is_object())
        .map(|a| ShippingAddress {
            street: text(a, "street").or_else(|| text(a, "address")).unwrap_or_default(),
            city: text_or_empty(a, "city"),
            region: text_or_empty(a, "region"),
            postal_code: text_or_empty(a, "postalCode"),
            country: text_or_empty(a, "country"),
        });

    Some(Order {
        status,
        total_amount: number(v, "totalAmount").unwrap_or(0.0),
        placed_at: text(v, "placedAt")
            .or_else(|| text(v, "createdAt"))
            .unwrap_or_default(),
        items,
        payment_status: text(v, "paymentStatus").and_then(|s| PaymentStatus::parse(&s)),
        payment_method: text(v, "paymentMethod"),
        user_id: text(v, "userId").or_else(|| v.get("user").and_then(|u| text(u, "id"))),
        notes: text(v, "notes"),
        customer,
        shipping_address,
        updated_at: text(v, "updatedAt"),
        id,
    })
}

fn item_from_payload(item: &Value) -> OrderItem {
    let empty = Value::Null;
    let variant = item.get("variant").unwrap_or(&empty);
    let product_name = variant
        .get("product")
        .and_then(|p| text(p, "name"))
        .or_else(|| text(variant, "productName"))
        .unwrap_or_default();

    OrderItem {
        quantity: integer(item, "quantity").unwrap_or(0),
        price: number(item, "price").unwrap_or(0.0),
        variant: Variant {
            id: text(variant, "id")
                .or_else(|| text(item, "variantId"))
                .unwrap_or_default(),
            title: text_or_empty(variant, "title"),
            sku: text_or_empty(variant, "sku"),
            price: number(variant, "price").unwrap_or(0.0),
            stock: integer(variant, "stock").unwrap_or(0),
            color: text(variant, "color"),
            size: text(variant, "size"),
            product_name,
        },
    }
}

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// A status change for one order, from any live source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: String,
    pub status: OrderStatus,
    pub timestamp: Option<String>,
}

/// Summary relayed to dashboard metrics when a new order is placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderSummary {
    pub order_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: String,
    pub customer_name: Option<String>,
}

impl From<&Order> for NewOrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.placed_at.clone(),
            customer_name: order.customer.as_ref().map(Customer::full_name),
        }
    }
}
