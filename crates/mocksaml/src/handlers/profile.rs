//! Protected profile page.

use askama::Template;
use axum::response::IntoResponse;
use mocksaml_auth::CurrentUser;

use super::pages::HtmlTemplate;

/// One local attribute row.
pub struct AttributeRow {
    pub name: String,
    pub value: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub username: String,
    pub id: String,
    pub attributes: Vec<AttributeRow>,
    pub logout_url: &'static str,
}

/// Handler for GET /accounts/profile/
///
/// Anonymous requests are redirected to the login page by `CurrentUser`.
pub async fn profile(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let attributes = user
        .attributes
        .iter()
        .map(|(name, value)| AttributeRow {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();

    HtmlTemplate(ProfileTemplate {
        username: user.username,
        id: user.id.to_string(),
        attributes,
        logout_url: "/logout/",
    })
}
