use reqwest::StatusCode;
use serde::Deserialize;
use std::{env, time::Duration};
use tokio::time::sleep;

#[derive(Deserialize)]
struct AccountResponse {
    id: i32,
    garage_number: String,
    full_name: String,
    last_payed_year: String,
    payments: Vec<PaymentResponse>,
}

#[derive(Deserialize)]
struct PaymentResponse {
    year: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    code: String,
}

#[tokio::test]
async fn smoke_accounts_flow() {
    dotenvy::dotenv().ok();

    // Needs a running server; opt in with RUN_SMOKE_ACCOUNTS=1.
    let run_smoke = env::var("RUN_SMOKE_ACCOUNTS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !run_smoke {
        eprintln!("skipping smoke_accounts_flow (set RUN_SMOKE_ACCOUNTS=1 to enable)");
        return;
    }

    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3333".to_string());
    let client = reqwest::Client::new();
    wait_for_health(&client, &base_url, 30, 300).await;

    let suffix = std::process::id();
    let garage_number = format!("smoke-{suffix}");
    let year = format!("{}", 3000 + suffix % 5000);

    let blank = client
        .post(format!("{base_url}/api/v1/accounts"))
        .json(&serde_json::json!({
            "garage_number": garage_number,
            "full_name": "",
            "phone_number": "+380500000000",
            "address": "Smoke st. 1",
        }))
        .send()
        .await
        .expect("blank create request failed");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    let blank_body: ErrorResponse = blank.json().await.expect("blank error json");
    assert_eq!(blank_body.code, "invalid_input");

    let created = client
        .post(format!("{base_url}/api/v1/accounts"))
        .json(&serde_json::json!({
            "garage_number": garage_number,
            "full_name": "Smoke Owner",
            "phone_number": "+380500000000",
            "address": "Smoke st. 1",
        }))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(created.status(), StatusCode::CREATED);
    let account: AccountResponse = created.json().await.expect("create json");
    assert_eq!(account.garage_number, garage_number);
    assert_eq!(account.last_payed_year, "No payments");

    let duplicate = client
        .post(format!("{base_url}/api/v1/accounts"))
        .json(&serde_json::json!({
            "garage_number": garage_number,
            "full_name": "Someone Else",
            "phone_number": "+380500000001",
            "address": "Smoke st. 2",
        }))
        .send()
        .await
        .expect("duplicate request failed");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let rate = client
        .post(format!("{base_url}/api/v1/rates"))
        .json(&serde_json::json!({ "year": year, "price": 1200.0 }))
        .send()
        .await
        .expect("rate request failed");
    assert_eq!(rate.status(), StatusCode::CREATED);

    let payment = client
        .post(format!("{base_url}/api/v1/accounts/{}/payments", account.id))
        .json(&serde_json::json!({ "year": year, "amount": 1200.0 }))
        .send()
        .await
        .expect("payment request failed");
    assert_eq!(payment.status(), StatusCode::CREATED);

    let fetched: AccountResponse = client
        .get(format!("{base_url}/api/v1/accounts/{}", account.id))
        .send()
        .await
        .expect("get request failed")
        .json()
        .await
        .expect("get json");
    assert_eq!(fetched.full_name, "Smoke Owner");
    assert_eq!(fetched.last_payed_year, year);
    assert_eq!(fetched.payments.len(), 1);
    assert_eq!(fetched.payments[0].year, year);

    let found: Vec<AccountResponse> = client
        .get(format!("{base_url}/api/v1/accounts"))
        .query(&[("garage_number", garage_number.as_str())])
        .send()
        .await
        .expect("search request failed")
        .json()
        .await
        .expect("search json");
    assert!(found.iter().any(|a| a.id == account.id));

    let missing = client
        .get(format!("{base_url}/api/v1/accounts/{}", i32::MAX))
        .send()
        .await
        .expect("missing request failed");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

async fn wait_for_health(client: &reqwest::Client, base_url: &str, retries: usize, delay_ms: u64) {
    for _ in 0..retries {
        if let Ok(response) = client.get(format!("{base_url}/api/v1/health")).send().await {
            if response.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(delay_ms)).await;
    }
    panic!("{base_url} never became healthy");
}
