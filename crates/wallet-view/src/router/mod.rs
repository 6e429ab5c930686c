//! # Page Routing
//!
//! Maps navigation intents to the single current page. No history stack is
//! kept; each navigation replaces the target wholesale, pre-fill included, so
//! the Send page never becomes current with an empty form.

mod address;

use serde::{Deserialize, Serialize};

use crate::errors::PaymentRequestError;

pub use address::AddressFormat;

/// Data pre-filled into the Send page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPrefill {
    /// Recipient address
    pub address: String,
    /// Amount in base units
    pub amount: Option<i64>,
    /// Address book label
    pub label: Option<String>,
    /// Message attached to the payment
    pub message: Option<String>,
}

impl SendPrefill {
    /// Pre-fill with an address only.
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: None,
            label: None,
            message: None,
        }
    }
}

/// The currently visible page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTarget {
    /// Balances and recent activity
    #[default]
    Overview,
    /// Transaction history
    History,
    /// Address book
    AddressBook,
    /// Receive coins
    Receive,
    /// Send coins, optionally pre-filled
    Send {
        /// Recipient pre-fill
        prefill: Option<SendPrefill>,
    },
    /// Per-account report
    AccountReport,
    /// Multi-signature addresses
    MultiSig,
    /// Registered names
    NameView,
}

impl NavigationTarget {
    /// Send page, pre-filled with `address` unless it is empty.
    pub fn send_to(address: impl Into<String>) -> Self {
        let address = address.into();
        Self::Send {
            prefill: (!address.trim().is_empty()).then(|| SendPrefill::address(address)),
        }
    }

    /// Pre-fill of a Send target.
    #[must_use]
    pub fn prefill(&self) -> Option<&SendPrefill> {
        match self {
            Self::Send { prefill } => prefill.as_ref(),
            _ => None,
        }
    }

    /// Page title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::History => "Transactions",
            Self::AddressBook => "Address Book",
            Self::Receive => "Receive",
            Self::Send { .. } => "Send",
            Self::AccountReport => "Account Report",
            Self::MultiSig => "Multisig",
            Self::NameView => "Names",
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::Send {
                prefill: Some(prefill),
            } if prefill.address.trim().is_empty() => Self::Send { prefill: None },
            other => other,
        }
    }
}

/// Externally supplied payment request (URI, drag-and-drop, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Recipient address
    pub address: String,
    /// Amount in base units
    pub amount: Option<i64>,
    /// Address book label
    pub label: Option<String>,
    /// Message attached to the payment
    pub message: Option<String>,
}

impl PaymentRequest {
    /// Request for an address only.
    pub fn to(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: None,
            label: None,
            message: None,
        }
    }

    /// Set the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<PaymentRequest> for SendPrefill {
    fn from(request: PaymentRequest) -> Self {
        Self {
            address: request.address,
            amount: request.amount,
            label: request.label,
            message: request.message,
        }
    }
}

/// Holds the current navigation target.
#[derive(Debug, Clone)]
pub struct PageRouter {
    current: NavigationTarget,
    max_money: i64,
}

impl PageRouter {
    /// Create a router starting on the overview page.
    pub fn new(max_money: i64) -> Self {
        Self {
            current: NavigationTarget::Overview,
            max_money,
        }
    }

    /// Current target.
    #[must_use]
    pub fn current(&self) -> &NavigationTarget {
        &self.current
    }

    /// Replace the current target.
    pub fn navigate(&mut self, target: NavigationTarget) -> &NavigationTarget {
        self.current = target.normalized();
        tracing::debug!(page = self.current.title(), "navigate");
        &self.current
    }

    /// Check a payment request against the address format and amount bounds.
    pub fn validate_payment_request<F>(
        &self,
        request: &PaymentRequest,
        is_valid_address: F,
    ) -> Result<(), PaymentRequestError>
    where
        F: Fn(&str) -> bool,
    {
        if !is_valid_address(request.address.trim()) {
            return Err(PaymentRequestError::InvalidAddress(request.address.clone()));
        }
        if let Some(amount) = request.amount {
            if amount <= 0 || amount > self.max_money {
                return Err(PaymentRequestError::AmountOutOfRange(amount));
            }
        }
        Ok(())
    }

    /// Validate a payment request and navigate to a pre-filled Send page.
    ///
    /// On rejection the current target is left unchanged.
    pub fn accept_payment_request<F>(
        &mut self,
        request: PaymentRequest,
        is_valid_address: F,
    ) -> Result<&NavigationTarget, PaymentRequestError>
    where
        F: Fn(&str) -> bool,
    {
        self.validate_payment_request(&request, is_valid_address)?;
        Ok(self.navigate(NavigationTarget::Send {
            prefill: Some(request.into()),
        }))
    }

    /// Route a payment request, reporting only whether it was accepted.
    pub fn handle_payment_request<F>(&mut self, request: PaymentRequest, is_valid_address: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self.accept_payment_request(request, is_valid_address) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "payment request rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_MONEY: i64 = 336_000_000 * 100_000_000;

    fn valid_address() -> String {
        AddressFormat::encode(14, &[1u8; 20])
    }

    fn format() -> AddressFormat {
        AddressFormat::new([14u8, 5])
    }

    #[test]
    fn test_navigate_replaces_target() {
        let mut router = PageRouter::new(MAX_MONEY);
        assert_eq!(router.current(), &NavigationTarget::Overview);
        router.navigate(NavigationTarget::History);
        router.navigate(NavigationTarget::MultiSig);
        assert_eq!(router.current(), &NavigationTarget::MultiSig);
    }

    #[test]
    fn test_empty_prefill_is_dropped() {
        let mut router = PageRouter::new(MAX_MONEY);
        router.navigate(NavigationTarget::send_to(""));
        assert_eq!(router.current(), &NavigationTarget::Send { prefill: None });

        router.navigate(NavigationTarget::Send {
            prefill: Some(SendPrefill::address("  ")),
        });
        assert_eq!(router.current().prefill(), None);
    }

    #[test]
    fn test_accepted_request_prefills_send() {
        let mut router = PageRouter::new(MAX_MONEY);
        let format = format();
        let request = PaymentRequest::to(valid_address())
            .with_amount(50_000)
            .with_label("coffee");
        assert!(router.handle_payment_request(request, |a| format.is_valid(a)));

        let prefill = router.current().prefill().unwrap();
        assert_eq!(prefill.address, valid_address());
        assert_eq!(prefill.amount, Some(50_000));
        assert_eq!(prefill.label.as_deref(), Some("coffee"));
    }

    #[test]
    fn test_rejected_request_leaves_target_unchanged() {
        let mut router = PageRouter::new(MAX_MONEY);
        router.navigate(NavigationTarget::Receive);
        let format = format();

        assert!(!router.handle_payment_request(PaymentRequest::to("bogus"), |a| format
            .is_valid(a)));
        assert!(!router.handle_payment_request(
            PaymentRequest::to(valid_address()).with_amount(0),
            |a| format.is_valid(a)
        ));
        assert!(!router.handle_payment_request(
            PaymentRequest::to(valid_address()).with_amount(MAX_MONEY + 1),
            |a| format.is_valid(a)
        ));
        assert_eq!(router.current(), &NavigationTarget::Receive);
    }

    #[test]
    fn test_validation_errors() {
        let router = PageRouter::new(MAX_MONEY);
        let format = format();
        assert_eq!(
            router.validate_payment_request(&PaymentRequest::to("x"), |a| format.is_valid(a)),
            Err(PaymentRequestError::InvalidAddress("x".to_string()))
        );
        assert_eq!(
            router.validate_payment_request(
                &PaymentRequest::to(valid_address()).with_amount(-5),
                |a| format.is_valid(a)
            ),
            Err(PaymentRequestError::AmountOutOfRange(-5))
        );
    }
}
