//! Language Switch

use axum::{
    http::{header::REFERER, HeaderMap, Uri},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::dto::request::LanguageQuery;
use crate::presentation::http::extractors::ApiQuery;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::{Locale, LOCALE_COOKIE};

/// Store the picked language in the `lang` cookie and go back.
#[utoipa::path(
    get,
    path = "/changeLanguage",
    tag = "public",
    params(LanguageQuery),
    responses(
        (status = 303, description = "`lang` cookie set, redirect to the referring page"),
        (status = 400, description = "Unsupported language", body = ErrorResponse)
    )
)]
pub async fn change_language(
    locale: Locale,
    jar: CookieJar,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<LanguageQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let picked = Locale::parse(&query.lang)
        .ok_or_else(|| AppError::BadRequest(locale.t("error.language.unsupported").into()))?;

    let cookie = Cookie::build((LOCALE_COOKIE, picked.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .permanent()
        .build();

    let target = back_target(&headers);
    tracing::debug!(lang = %picked, %target, "Language changed");

    Ok((jar.add(cookie), Redirect::to(&target)))
}

/// Path of the `Referer`, dropping scheme and host so the redirect stays
/// on this site.
fn back_target(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use test_case::test_case;

    #[test_case(Some("http://localhost:8080/mascotas?x=1"), "/mascotas?x=1" ; "absolute referer")]
    #[test_case(Some("/citas/mis-citas"), "/citas/mis-citas" ; "relative referer")]
    #[test_case(Some("https://evil.example"), "/" ; "bare host")]
    #[test_case(None, "/" ; "no referer")]
    fn test_back_target(referer: Option<&str>, expected: &str) {
        let mut headers = HeaderMap::new();
        if let Some(value) = referer {
            headers.insert(REFERER, HeaderValue::from_str(value).unwrap());
        }
        assert_eq!(back_target(&headers), expected);
    }
}
