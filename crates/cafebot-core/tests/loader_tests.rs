use std::fs;

use cafebot_core::error::Error;
use cafebot_core::loader::{dedupe_faqs, normalize_text, Dataset};
use cafebot_core::store::FaqRow;
use tempfile::TempDir;

#[test]
fn normalize_lowercases_expands_and_collapses() {
    assert_eq!(normalize_text("  Can U   deliver\tToday "), "can you deliver today");
    assert_eq!(normalize_text("Iced  Latte"), "iced latte");
}

#[test]
fn dedupe_keeps_longest_answer_in_first_slot() {
    let rows = vec![
        FaqRow { question: "hours".to_string(), answer: "9-5".to_string() },
        FaqRow { question: "wifi".to_string(), answer: "yes".to_string() },
        FaqRow { question: "hours".to_string(), answer: "9am to 5pm daily".to_string() },
        FaqRow { question: "hours".to_string(), answer: "short".to_string() },
    ];
    let out = dedupe_faqs(rows);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].question, "hours");
    assert_eq!(out[0].answer, "9am to 5pm daily");
    assert_eq!(out[1].question, "wifi");
}

#[test]
fn dataset_loads_string_and_numeric_ids() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("items.json"), r#"[{"id": 1, "item": "Cold  Brew"}, {"id": "b2", "item": "Scone"}]"#).unwrap();
    fs::write(dir.join("faq.json"), r#"[{"question": "Do U have WiFi?", "answer": "Yes, free."}]"#).unwrap();
    fs::write(dir.join("orders.json"), r#"[{"id": 1, "times_appeared": 12, "food_rating": 4.2}]"#).unwrap();

    let data = Dataset::load(&dir.join("items.json"), &dir.join("faq.json"), &dir.join("orders.json")).expect("load");

    assert_eq!(data.items[0].item_id, "1");
    assert_eq!(data.items[0].item_name, "cold brew");
    assert_eq!(data.items[1].item_id, "b2");
    assert_eq!(data.faqs[0].question, "do you have wifi?");
    assert_eq!(data.faqs[0].answer, "Yes, free.", "answers are kept verbatim");
    assert_eq!(data.orders[0].item_id, "1");
    assert_eq!(data.orders[0].num_orders, 12);
}

#[test]
fn missing_table_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.json");
    let result = Dataset::load(&missing, &missing, &missing);
    assert!(matches!(result, Err(Error::NotFound(_))));
}
