use super::*;

#[test]
fn user_parses_me_payload() {
    let json = serde_json::json!({
        "id": "u-1",
        "username": "alice",
        "name": "Alice",
        "point_balance": 1200,
        "profile": { "image": null, "role": "student", "is_totp_verified": true }
    });
    let user: User = serde_json::from_value(json).unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.point_balance, 1200);
    assert_eq!(user.profile.role, Role::Student);
    assert!(user.profile.image_url.is_none());
    assert!(user.profile.totp_verified);
}

#[test]
fn user_rejects_unknown_role() {
    let json = serde_json::json!({
        "id": "u-1",
        "username": "alice",
        "profile": { "image": null, "role": "janitor" }
    });
    assert!(serde_json::from_value::<User>(json).is_err());
}

#[test]
fn role_as_str_matches_wire_names() {
    assert_eq!(Role::Student.as_str(), "student");
    assert_eq!(Role::Teacher.as_str(), "teacher");
    assert_eq!(Role::Admin.as_str(), "admin");
}

#[test]
fn item_tolerates_missing_optional_fields() {
    let json = serde_json::json!({ "id": "itm_1", "name": "Pencil", "price": 30 });
    let item: Item = serde_json::from_value(json).unwrap();
    assert_eq!(item.price, 30);
    assert!(item.image_url.is_none());
    assert!(item.stock.is_none());
}

#[test]
fn search_response_missing_items_is_empty() {
    let resp: SearchResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.into_items().is_empty());
}

#[test]
fn search_response_non_array_items_is_empty() {
    let resp: SearchResponse = serde_json::from_str(r#"{"items": "nope"}"#).unwrap();
    assert!(resp.into_items().is_empty());
}

#[test]
fn search_response_keeps_well_formed_hits() {
    let resp: SearchResponse = serde_json::from_str(
        r#"{"items": [
            {"title": "Notebook", "image": "http://img/1", "price": 480, "url": "http://shop/1"},
            {"title": "Unknown price", "image": "", "price": null, "url": "http://shop/2"},
            {"no_title": true}
        ]}"#,
    )
    .unwrap();
    let items = resp.into_items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Notebook");
    assert_eq!(items[1].price, None);
}
