
use std::fs::File;

use actix_web::http::header::ContentType;
use actix_web::test::{call_service, read_body, TestRequest};
use serde_json::{json, Value as JsnVal};

use storefront::api::web::dto::ProductDto;

use common::{itest_setup_app_server, itest_sign_webhook};

const ADD_PRODUCTS_OK: &str = "./tests/integration/examples/add_products_ok.json";
const ADD_PRODUCTS_INVALID: &str = "./tests/integration/examples/add_products_invalid.json";
const WEBHOOK_ORDER_PAID: &str = "./tests/integration/examples/webhook_order_paid.json";

fn load_example(path: &str) -> JsnVal {
    let rdr = File::open(path).unwrap();
    serde_json::from_reader::<File, JsnVal>(rdr).unwrap()
}

async fn itest_add_product<S, B>(app: &S, body: JsnVal) -> ProductDto
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/products/add")
        .append_header(ContentType::json())
        .set_json(body)
        .to_request();
    let resp = call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let raw = read_body(resp).await;
    serde_json::from_slice::<ProductDto>(&raw).unwrap()
}

async fn itest_list_products<S, B>(app: &S) -> Vec<ProductDto>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = TestRequest::get().uri("/api/products").to_request();
    let resp = call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let raw = read_body(resp).await;
    serde_json::from_slice::<Vec<ProductDto>>(&raw).unwrap()
}

fn itest_webhook_body(product_id: &str, quantity: Option<&str>) -> Vec<u8> {
    let mut body = load_example(WEBHOOK_ORDER_PAID);
    let notes = body
        .pointer_mut("/payload/order/entity/notes")
        .unwrap()
        .as_object_mut()
        .unwrap();
    notes.insert("product_id".to_string(), JsnVal::String(product_id.to_string()));
    match quantity {
        Some(q) => {
            notes.insert("quantity".to_string(), JsnVal::String(q.to_string()));
        }
        None => {
            notes.remove("quantity");
        }
    }
    serde_json::to_vec(&body).unwrap()
}

#[actix_web::test]
async fn add_list_products_ok() {
    let mock_app = itest_setup_app_server().await;
    let listed = itest_list_products(&mock_app).await;
    assert!(listed.is_empty());

    let req = TestRequest::post()
        .uri("/api/products/add")
        .append_header(ContentType::json())
        .set_json(load_example(ADD_PRODUCTS_OK))
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let raw = read_body(resp).await;
    let saved = serde_json::from_slice::<Vec<ProductDto>>(&raw).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].price.as_str(), "29990.00");
    assert_eq!(saved[1].price.as_str(), "4999.50");
    assert_eq!(saved[1].quantity, 10);

    let single = json!({"title": "Laptop Backpack", "price": "2499.99", "quantity": 3});
    let saved_single = itest_add_product(&mock_app, single).await;
    assert_eq!(saved_single.title.as_str(), "Laptop Backpack");
    assert_eq!(saved_single.quantity, 3);
    assert!(saved_single.description.is_empty());

    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed.len(), 3);
    let titles = listed.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["Smartphone X", "Wireless Earbuds", "Laptop Backpack"]
    );
} // end of fn add_list_products_ok

#[actix_web::test]
async fn add_products_invalid() {
    let mock_app = itest_setup_app_server().await;
    let req = TestRequest::post()
        .uri("/api/products/add")
        .append_header(ContentType::json())
        .set_json(load_example(ADD_PRODUCTS_INVALID))
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let raw = read_body(resp).await;
    let errors = serde_json::from_slice::<JsnVal>(&raw).unwrap();
    let errors = errors.as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["index"].as_u64(), Some(1));
    assert_eq!(errors[0]["reason"].as_str(), Some("EmptyTitle"));
    assert_eq!(errors[1]["reason"].as_str(), Some("NegativePrice"));
    assert_eq!(errors[2]["reason"].as_str(), Some("InvalidPrice"));
    let listed = itest_list_products(&mock_app).await;
    assert!(listed.is_empty());

    // malformed body rejected by the extractor
    let req = TestRequest::post()
        .uri("/api/products/add")
        .append_header(ContentType::json())
        .set_payload("{\"title\": \"Desk\", \"price\": ")
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn create_order_ok() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Fitness Band", "price": "100.00", "quantity": 10});
    let product = itest_add_product(&mock_app, body).await;

    let uri = format!("/api/payment/create-order/{}?quantity=2", product.id);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let raw = read_body(resp).await;
    let order = serde_json::from_slice::<JsnVal>(&raw).unwrap();
    assert_eq!(order["amount"].as_i64(), Some(20000));
    assert_eq!(order["currency"].as_str(), Some("INR"));
    let expect_pid = product.id.to_string();
    assert_eq!(order["notes"]["product_id"].as_str(), Some(expect_pid.as_str()));
    assert_eq!(order["notes"]["quantity"].as_str(), Some("2"));

    // quantity defaults to 1
    let uri = format!("/api/payment/create-order/{}", product.id);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let raw = read_body(resp).await;
    let order = serde_json::from_slice::<JsnVal>(&raw).unwrap();
    assert_eq!(order["amount"].as_i64(), Some(10000));
    assert_eq!(order["notes"]["quantity"].as_str(), Some("1"));

    // no stock reserved before payment
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 10);
} // end of fn create_order_ok

#[actix_web::test]
async fn create_order_client_error() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Fitness Band", "price": "100.00", "quantity": 1});
    let product = itest_add_product(&mock_app, body).await;
    let cases = [
        format!("/api/payment/create-order/{}?quantity=5", product.id),
        format!("/api/payment/create-order/{}?quantity=0", product.id),
        format!("/api/payment/create-order/{}?quantity=-1", product.id),
        format!("/api/payment/create-order/{}", product.id + 1000),
    ];
    for uri in cases {
        let req = TestRequest::post().uri(uri.as_str()).to_request();
        let resp = call_service(&mock_app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }
}

#[actix_web::test]
async fn webhook_order_paid_ok() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Portable SSD", "price": "7499.00", "quantity": 4});
    let product = itest_add_product(&mock_app, body).await;

    let raw = itest_webhook_body(product.id.to_string().as_str(), Some("2"));
    let sig = itest_sign_webhook(&raw);
    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(ContentType::json())
        .append_header(("X-Razorpay-Signature", sig.as_str()))
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body = read_body(resp).await;
    assert_eq!(body.as_ref(), b"Webhook received and processed");
    // remaining 2 is below threshold, the alert goes to dummy mailer
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 2);

    // more than on-hand stock, acknowledged without mutation
    let raw = itest_webhook_body(product.id.to_string().as_str(), Some("5"));
    let sig = itest_sign_webhook(&raw);
    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(("X-Razorpay-Signature", sig.as_str()))
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 2);
} // end of fn webhook_order_paid_ok

#[actix_web::test]
async fn webhook_invalid_signature() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Portable SSD", "price": "7499.00", "quantity": 4});
    let product = itest_add_product(&mock_app, body).await;
    let raw = itest_webhook_body(product.id.to_string().as_str(), Some("1"));
    let sig = itest_sign_webhook(&raw);
    let mut mutated = sig.into_bytes();
    mutated[0] = if mutated[0] == b'a' { b'b' } else { b'a' };
    let mutated = String::from_utf8(mutated).unwrap();

    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(("X-Razorpay-Signature", mutated.as_str()))
        .set_payload(raw.clone())
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body = read_body(resp).await;
    assert_eq!(body.as_ref(), b"Invalid signature");

    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 4);
}

#[actix_web::test]
async fn webhook_missing_product_id() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Portable SSD", "price": "7499.00", "quantity": 4});
    let _product = itest_add_product(&mock_app, body).await;
    let mut body = load_example(WEBHOOK_ORDER_PAID);
    let _removed = body
        .pointer_mut("/payload/order/entity/notes")
        .unwrap()
        .as_object_mut()
        .unwrap()
        .remove("product_id");
    let raw = serde_json::to_vec(&body).unwrap();
    let sig = itest_sign_webhook(&raw);
    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(("X-Razorpay-Signature", sig.as_str()))
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 4);
}

#[actix_web::test]
async fn webhook_unknown_product() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "USB Hub", "price": "1899.00", "quantity": 7});
    let product = itest_add_product(&mock_app, body).await;
    let unknown = (product.id + 987654).to_string();
    let raw = itest_webhook_body(unknown.as_str(), Some("1"));
    let sig = itest_sign_webhook(&raw);
    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(("X-Razorpay-Signature", sig.as_str()))
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 500);
    let body = read_body(resp).await;
    assert_eq!(body.as_ref(), b"Error processing webhook");
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 7);
}

#[actix_web::test]
async fn order_then_payment_settled() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "E-Reader", "price": "11999.00", "quantity": 6});
    let product = itest_add_product(&mock_app, body).await;

    let uri = format!("/api/payment/create-order/{}?quantity=3", product.id);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let order = serde_json::from_slice::<JsnVal>(&read_body(resp).await).unwrap();
    assert_eq!(order["amount"].as_i64(), Some(3599700));

    let mut event = load_example(WEBHOOK_ORDER_PAID);
    *event.pointer_mut("/payload/order/entity/notes").unwrap() = order["notes"].clone();
    let raw = serde_json::to_vec(&event).unwrap();
    let sig = itest_sign_webhook(&raw);
    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .append_header(("X-Razorpay-Signature", sig.as_str()))
        .set_payload(raw)
        .to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 3);
}

#[actix_web::test]
async fn restock_product() {
    let mock_app = itest_setup_app_server().await;
    let body = json!({"title": "Wireless Charger", "price": "1299.00", "quantity": 2});
    let product = itest_add_product(&mock_app, body).await;

    let uri = format!("/api/products/{}/restock", product.id);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body = read_body(resp).await;
    assert_eq!(body.as_ref(), b"Product restocked successfully");
    let listed = itest_list_products(&mock_app).await;
    assert_eq!(listed[0].quantity, 20);

    let body = json!({"title": "Cable Organizer", "price": "249.00", "quantity": 50});
    let overstocked = itest_add_product(&mock_app, body).await;
    let uri = format!("/api/products/{}/restock", overstocked.id);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let listed = itest_list_products(&mock_app).await;
    let found = listed.iter().find(|p| p.id == overstocked.id).unwrap();
    assert_eq!(found.quantity, 20);

    let uri = format!("/api/products/{}/restock", product.id + 50);
    let req = TestRequest::post().uri(uri.as_str()).to_request();
    let resp = call_service(&mock_app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}
