//! Prelude

pub use crate::{
    cart::{Cart, CartAction, CartError},
    checkout::{
        CheckoutDetails, CheckoutOrder, OrderError, OrderLine, PaymentMethod, ShippingAddress,
        ShippingMethod,
    },
    ids::{OrderId, ProductId, RemoteId, UserId},
    items::{CartItem, NewCartItem},
    pricing::{PriceError, format_price},
    products::Product,
    variants::VariantKey,
};
