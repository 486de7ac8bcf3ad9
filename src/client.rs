//! Загрузка страниц с портала WatCard.

use std::fmt;
use std::time::Duration;

use crate::config::Settings;
use crate::error::WatcardError;
use crate::raw::RawPage;

/// Фраза, которой портал сообщает о неверных учётных данных.
pub const AUTH_FAILURE_MARKER: &str = "The Account or PIN code is incorrect!";

/// Учётные данные владельца карты.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Номер студента (WatIAM ID).
    pub userid: String,
    /// PIN карты.
    pub pin: String,
}

impl Credentials {
    /// Создаёт учётные данные.
    pub fn new(userid: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("userid", &self.userid)
            .field("pin", &"***")
            .finish()
    }
}

/// Страница портала с нужным набором данных.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalPage {
    /// История операций за всё время.
    Transactions,
    /// Текущие балансы подсчетов.
    Balances,
}

impl PortalPage {
    /// Поля формы для запроса страницы.
    pub fn form<'a>(self, credentials: &'a Credentials) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![
            ("acnt_1", credentials.userid.as_str()),
            ("acnt_2", credentials.pin.as_str()),
        ];
        match self {
            Self::Transactions => form.extend([
                ("DBDATE", "01/01/0001"),
                ("DEDATE", "01/01/2111"),
                ("PASS", "PASS"),
                ("STATUS", "HIST"),
            ]),
            Self::Balances => form.extend([("FINDATAREP", "ON"), ("STATUS", "STATUS")]),
        }
        form
    }
}

/// Источник страниц портала.
pub trait Portal {
    /// Загружает страницу. Ответ с [`AUTH_FAILURE_MARKER`] должен давать
    /// [`WatcardError::Authentication`].
    fn fetch(&self, page: PortalPage, credentials: &Credentials) -> Result<RawPage, WatcardError>;

    /// Загружает историю операций.
    fn fetch_transactions(&self, credentials: &Credentials) -> Result<RawPage, WatcardError> {
        self.fetch(PortalPage::Transactions, credentials)
    }

    /// Загружает балансы.
    fn fetch_balances(&self, credentials: &Credentials) -> Result<RawPage, WatcardError> {
        self.fetch(PortalPage::Balances, credentials)
    }
}

/// Проверяет ответ портала: сначала признак ошибки авторизации в теле,
/// затем HTTP-статус. Страница отказа приходит и с кодами 4xx.
pub fn check_response(status: u16, body: String) -> Result<RawPage, WatcardError> {
    let page = check_auth(body)?;
    if !(200..300).contains(&status) {
        return Err(WatcardError::Status { status });
    }
    Ok(page)
}

/// Проверяет тело ответа на признак ошибки авторизации.
pub fn check_auth(body: String) -> Result<RawPage, WatcardError> {
    if body.contains(AUTH_FAILURE_MARKER) {
        return Err(WatcardError::Authentication);
    }
    Ok(RawPage { html: body })
}

/// Портал, доступный по HTTP.
#[derive(Debug, Clone)]
pub struct HttpPortal {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPortal {
    /// Создаёт клиента по настройкам.
    pub fn new(settings: &Settings) -> Result<Self, WatcardError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }
}

impl Portal for HttpPortal {
    fn fetch(&self, page: PortalPage, credentials: &Credentials) -> Result<RawPage, WatcardError> {
        tracing::debug!(?page, endpoint = %self.endpoint, "requesting portal page");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&page.form(credentials))
            .send()?;
        let status = response.status().as_u16();
        check_response(status, response.text()?)
    }
}
