use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use sojourn_core::gateway::{
    GatewayError, InitializeOutcome, InitializeRequest, PaymentGateway, VerifyOutcome,
};

/// Chapa payment gateway client. The secret key and base URL are injected at
/// construction; nothing reads the environment per call.
#[derive(Clone)]
pub struct ChapaGateway {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl ChapaGateway {
    pub fn new(http: Client, base_url: &str, secret_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }
}

/// Chapa's response envelope: `status` is `"success"` or an error marker,
/// `message` carries the human-readable detail, `data` the payload.
#[derive(Debug, Deserialize)]
struct ChapaEnvelope {
    status: String,
    message: Option<serde_json::Value>,
    data: Option<ChapaData>,
}

#[derive(Debug, Deserialize)]
struct ChapaData {
    checkout_url: Option<String>,
}

impl ChapaEnvelope {
    fn detail(&self) -> String {
        match &self.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("Gateway answered with status '{}'", self.status),
        }
    }
}

#[async_trait]
impl PaymentGateway for ChapaGateway {
    async fn initialize(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeOutcome, GatewayError> {
        // Chapa takes the amount as a string and flat customization keys.
        let payload = json!({
            "amount": request.amount.to_string(),
            "currency": request.currency,
            "email": request.email,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "tx_ref": request.tx_ref,
            "callback_url": request.callback_url,
            "return_url": request.return_url,
            "customization[title]": request.title,
            "customization[description]": request.description,
        });

        let response = self
            .http
            .post(format!("{}/v1/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let envelope: ChapaEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if envelope.status == "success" {
            let checkout_url = envelope
                .data
                .and_then(|d| d.checkout_url)
                .ok_or_else(|| {
                    GatewayError::InvalidResponse("Success envelope without checkout_url".into())
                })?;
            Ok(InitializeOutcome::Accepted { checkout_url })
        } else {
            Ok(InitializeOutcome::Declined {
                detail: envelope.detail(),
            })
        }
    }

    async fn verify(&self, tx_ref: &str) -> Result<VerifyOutcome, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/transaction/verify/{}", self.base_url, tx_ref))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let envelope: ChapaEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if envelope.status == "success" {
            Ok(VerifyOutcome::Confirmed)
        } else {
            Ok(VerifyOutcome::Declined {
                detail: envelope.detail(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(tx_ref: &str) -> InitializeRequest {
        InitializeRequest {
            amount: dec!(300.00),
            currency: "ETB".into(),
            email: "guest@example.com".into(),
            first_name: "Asha".into(),
            last_name: "Bekele".into(),
            tx_ref: tx_ref.into(),
            callback_url: "http://localhost:8080/v1/payments/verify".into(),
            return_url: "http://localhost:8080/payment-success".into(),
            title: "Payment for Hotel Booking".into(),
            description: "Booking for Sunrise Lodge".into(),
        }
    }

    #[tokio::test]
    async fn test_initialize_success_yields_checkout_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transaction/initialize"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "amount": "300.00",
                "currency": "ETB",
                "tx_ref": "booking-1-abc",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "Hosted Link",
                "data": { "checkout_url": "https://checkout.chapa.co/pay/abc" }
            })))
            .mount(&server)
            .await;

        let gateway = ChapaGateway::new(Client::new(), &server.uri(), "sk-test".into());
        let outcome = gateway.initialize(&request("booking-1-abc")).await.unwrap();

        assert_eq!(
            outcome,
            InitializeOutcome::Accepted {
                checkout_url: "https://checkout.chapa.co/pay/abc".into()
            }
        );
    }

    #[tokio::test]
    async fn test_initialize_failure_envelope_is_declined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transaction/initialize"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "failed",
                "message": "Invalid currency",
                "data": null
            })))
            .mount(&server)
            .await;

        let gateway = ChapaGateway::new(Client::new(), &server.uri(), "sk-test".into());
        let outcome = gateway.initialize(&request("booking-2-def")).await.unwrap();

        assert_eq!(
            outcome,
            InitializeOutcome::Declined {
                detail: "Invalid currency".into()
            }
        );
    }

    #[tokio::test]
    async fn test_verify_success_and_decline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/transaction/verify/booking-3-ghi"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "Payment details",
                "data": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/transaction/verify/booking-4-jkl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "failed",
                "message": "Transaction not paid",
                "data": null
            })))
            .mount(&server)
            .await;

        let gateway = ChapaGateway::new(Client::new(), &server.uri(), "sk-test".into());

        assert_eq!(
            gateway.verify("booking-3-ghi").await.unwrap(),
            VerifyOutcome::Confirmed
        );
        assert_eq!(
            gateway.verify("booking-4-jkl").await.unwrap(),
            VerifyOutcome::Declined {
                detail: "Transaction not paid".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_a_transport_error() {
        // Port 9 is discard; nothing listens there.
        let gateway = ChapaGateway::new(Client::new(), "http://127.0.0.1:9", "sk-test".into());
        let err = gateway.verify("booking-5-mno").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
