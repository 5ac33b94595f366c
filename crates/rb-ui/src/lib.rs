use askama::Template;
use rb_core::models::{Ad, Post};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub title: &'a str,
    /// Username of the logged-in visitor; drives the account links in the nav.
    pub current_user: Option<&'a str>,
    pub username: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub username: &'a str,
    pub email: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct PostIndexTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub posts: &'a [Post],
}

#[derive(Template)]
#[template(path = "posts/show.html")]
pub struct PostShowTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub post: &'a Post,
    pub author: &'a str,
}

#[derive(Template)]
#[template(path = "posts/create.html")]
pub struct PostFormTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub post_title: &'a str,
    pub body: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "ads/index.html")]
pub struct AdIndexTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub ads: &'a [Ad],
}

#[derive(Template)]
#[template(path = "ads/show.html")]
pub struct AdShowTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub ad: &'a Ad,
    pub owner: &'a str,
}

/// Shared by the create and edit pages; `action` is the form target.
#[derive(Template)]
#[template(path = "ads/form.html")]
pub struct AdFormTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub action: &'a str,
    pub ad_title: &'a str,
    pub description: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub current_user: Option<&'a str>,
    pub status: u16,
    pub message: &'a str,
}
