//! Payment initialization against the gateway.
//!
//! [`Client`] runs the whole `payment/init` sequence: finalize the request,
//! sign the canonical payload, submit it through a [`Transport`] and store
//! the pay ID the gateway assigns.

use std::future::Future;
use std::pin::Pin;

use crate::config::MerchantConfig;
use crate::error::{PaymentError, SignatureError, TransportError, ValidationError};
use crate::payment::{PaymentRequest, PreparedPayment};
use crate::proto::Payload;
use crate::signature::Signer;

/// A boxed, `Send` future returned by the async collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Delivers signed requests to the payment gateway.
///
/// Implementations typically POST the payload as JSON, verify the response
/// signature and map a non-zero `resultCode` to a [`TransportError`].
pub trait Transport: Send + Sync {
    /// Submits a signed `payment/init` payload and returns the assigned pay ID.
    fn init_payment(&self, payload: Payload) -> BoxFuture<'_, Result<String, TransportError>>;
}

/// Gateway client bundling the merchant configuration with a signer and a
/// transport.
pub struct Client<S, T> {
    config: MerchantConfig,
    signer: S,
    transport: T,
}

impl<S, T> std::fmt::Debug for Client<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("merchant_id", &self.config.merchant_id)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl<S: Signer, T: Transport> Client<S, T> {
    /// Creates a client.
    pub const fn new(config: MerchantConfig, signer: S, transport: T) -> Self {
        Self {
            config,
            signer,
            transport,
        }
    }

    /// Merchant configuration.
    #[must_use]
    pub const fn config(&self) -> &MerchantConfig {
        &self.config
    }

    /// Finalizes `request` against this client's configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the request is incomplete.
    pub fn prepare(&self, request: PaymentRequest) -> Result<PreparedPayment, ValidationError> {
        request.check_and_prepare(&self.config)
    }

    /// Builds the signed `payment/init` payload for `payment`.
    ///
    /// # Errors
    ///
    /// Returns the [`SignatureError`] reported by the signer.
    pub fn sign(&self, payment: &PreparedPayment) -> Result<Payload, SignatureError> {
        payment.to_signed_payload(&self.config, &self.signer)
    }

    /// Initializes a payment at the gateway.
    ///
    /// On success the returned payment carries the pay ID the gateway
    /// assigned. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if validation, signing or submission fails.
    pub async fn payment_init(&self, request: PaymentRequest) -> Result<PreparedPayment, PaymentError> {
        let mut payment = self.prepare(request)?;
        let payload = self.sign(&payment)?;

        let pay_id = match self.transport.init_payment(payload).await {
            Ok(pay_id) => pay_id,
            Err(e) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(order_no = %payment.order_no(), error = %e, "payment init failed");
                return Err(e.into());
            }
        };

        #[cfg(feature = "telemetry")]
        tracing::debug!(order_no = %payment.order_no(), pay_id = %pay_id, "payment initialized");

        payment.set_pay_id(pay_id)?;
        Ok(payment)
    }
}
