//! One-shot notices carried across a redirect in a cookie.
//!
//! A form handler answers with a `FlashRedirect`; the page it redirects to
//! reads the notice through the `Flashes` extractor and clears the cookie.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use crate::config::FLASH_COOKIE;
use crate::domain::Denial;
use crate::types::{Notice, NoticeLevel, Page};

const SEPARATOR: char = '|';

/// Cookie holding `notice` until the next page is rendered.
pub fn flash_cookie(notice: &Notice) -> Cookie<'static> {
    let value = format!("{}{}{}", notice.level.as_str(), SEPARATOR, notice.text);
    Cookie::build((FLASH_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Pending notice in `jar`, if the cookie is present and well formed.
pub fn read_notice(jar: &CookieJar) -> Option<Notice> {
    let cookie = jar.get(FLASH_COOKIE)?;
    let (level, text) = cookie.value().split_once(SEPARATOR)?;
    let level = level.parse::<NoticeLevel>().ok()?;
    if text.is_empty() {
        return None;
    }

    Some(Notice {
        level,
        text: text.to_string(),
    })
}

/// `303 See Other` to `to`, with an optional notice and extra cookies.
#[derive(Debug)]
pub struct FlashRedirect {
    to: String,
    notice: Option<Notice>,
    cookies: Vec<Cookie<'static>>,
}

impl FlashRedirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            notice: None,
            cookies: Vec::new(),
        }
    }

    pub fn success(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::to(path).with_notice(Notice::success(text))
    }

    pub fn info(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::to(path).with_notice(Notice::info(text))
    }

    pub fn error(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::to(path).with_notice(Notice::error(text))
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn location(&self) -> &str {
        &self.to
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

impl From<Denial> for FlashRedirect {
    fn from(denial: Denial) -> Self {
        FlashRedirect::error(denial.to, denial.notice)
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut jar = CookieJar::new();
        for cookie in self.cookies {
            jar = jar.add(cookie);
        }
        if let Some(notice) = &self.notice {
            jar = jar.add(flash_cookie(notice));
        }

        (jar, Redirect::to(&self.to)).into_response()
    }
}

/// Notices waiting for the current page.
#[derive(Debug)]
pub struct Flashes {
    notices: Vec<Notice>,
    jar: CookieJar,
}

impl Flashes {
    /// Render `data` with the pending notices and consume the flash cookie.
    pub fn render<T: Serialize>(self, data: T) -> (CookieJar, Page<T>) {
        let jar = if self.notices.is_empty() {
            self.jar
        } else {
            self.jar
                .remove(Cookie::build((FLASH_COOKIE, "")).path("/").build())
        };

        (jar, Page::with_notices(data, self.notices))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let notices = read_notice(&jar).into_iter().collect();

        Ok(Flashes { notices, jar })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, header::SET_COOKIE, StatusCode};

    #[test]
    fn test_notice_survives_the_cookie() {
        let notice = Notice::success("Réservation confirmée : table 3 | 20:00");
        let jar = CookieJar::new().add(flash_cookie(&notice));

        assert_eq!(read_notice(&jar), Some(notice));
    }

    #[test]
    fn test_malformed_cookie_is_ignored() {
        for value in ["", "no-separator", "panic|boom", "error|"] {
            let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, value));
            assert_eq!(read_notice(&jar), None, "value {:?}", value);
        }
    }

    #[test]
    fn test_redirect_is_see_other_with_flash() {
        let response = FlashRedirect::error("/commander", "Votre panier est vide.").into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/commander");
        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("bistrot_flash="));
    }

    #[test]
    fn test_plain_redirect_sets_no_cookie() {
        let response = FlashRedirect::to("/").into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_denial_becomes_error_notice() {
        let redirect = FlashRedirect::from(Denial {
            to: "/login",
            notice: "Vous devez être connecté pour accéder à cette page.",
        });

        assert_eq!(redirect.location(), "/login");
        assert_eq!(redirect.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }
}
