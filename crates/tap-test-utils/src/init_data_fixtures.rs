//! Signed initData fixtures.
//!
//! Builds `X-Telegram-Init-Data` header values signed with the test bot
//! token, the same way Telegram signs them for a real Mini App launch.

use common::init_data;
use common::secret::SecretString;
use std::collections::BTreeMap;

/// Bot token every test server is configured with.
pub const TEST_BOT_TOKEN: &str = "7000000000:TEST-tap-service-bot-token";

/// Sign `pairs` with [`TEST_BOT_TOKEN`] and encode them as a query string
/// with the `hash` field appended.
pub fn signed_init_data(pairs: &[(&str, &str)]) -> String {
    signed_init_data_with_token(TEST_BOT_TOKEN, pairs)
}

/// Sign `pairs` with an arbitrary bot token.
pub fn signed_init_data_with_token(bot_token: &str, pairs: &[(&str, &str)]) -> String {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let hash = init_data::sign(&SecretString::from(bot_token), &fields);

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &fields {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

/// initData for `user_id` issued `age_seconds` ago.
pub fn init_data_issued_ago(user_id: i64, age_seconds: i64) -> String {
    let auth_date = (chrono::Utc::now().timestamp() - age_seconds).to_string();
    let user = format!(r#"{{"id":{user_id},"first_name":"Test","username":"tester{user_id}"}}"#);

    signed_init_data(&[
        ("auth_date", &auth_date),
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        ("user", &user),
    ])
}

/// initData for `user_id` issued just now.
pub fn fresh_init_data(user_id: i64) -> String {
    init_data_issued_ago(user_id, 0)
}
