//! The `Hyperwallet` facade: one method per API operation.
//!
//! # Design
//! Every operation validates its path tokens in parameter order, builds the
//! URL template and parameter list for its resource, and hands off to
//! `ApiClient`, which issues exactly one request. Validation failures return
//! `HyperwalletError::Argument` before anything reaches the transport.

use std::sync::Arc;

use crate::api_client::{ApiClient, QueryParams};
use crate::config::Config;
use crate::error::{HyperwalletError, Result};
use crate::http::Transport;
use crate::list::ListResponse;
use crate::model::{
    BankAccount, Payment, PrepaidCard, Program, Resource, StatusTransition, Transition, User,
};
use crate::transport::UreqTransport;

const USERS: &str = "/rest/v3/users";
const USER: &str = "/rest/v3/users/{user-token}";
const PREPAID_CARDS: &str = "/rest/v3/users/{user-token}/prepaid-cards";
const PREPAID_CARD: &str = "/rest/v3/users/{user-token}/prepaid-cards/{prepaid-card-token}";
const PREPAID_CARD_TRANSITIONS: &str =
    "/rest/v3/users/{user-token}/prepaid-cards/{prepaid-card-token}/status-transitions";
const PREPAID_CARD_TRANSITION: &str = "/rest/v3/users/{user-token}/prepaid-cards/{prepaid-card-token}/status-transitions/{status-transition-token}";
const BANK_ACCOUNTS: &str = "/rest/v3/users/{user-token}/bank-accounts";
const BANK_ACCOUNT: &str = "/rest/v3/users/{user-token}/bank-accounts/{bank-account-token}";
const BANK_ACCOUNT_TRANSITIONS: &str =
    "/rest/v3/users/{user-token}/bank-accounts/{bank-account-token}/status-transitions";
const BANK_ACCOUNT_TRANSITION: &str = "/rest/v3/users/{user-token}/bank-accounts/{bank-account-token}/status-transitions/{status-transition-token}";
const PAYMENTS: &str = "/rest/v3/payments";
const PAYMENT: &str = "/rest/v3/payments/{payment-token}";
const PROGRAM: &str = "/rest/v3/programs/{program-token}";

/// Client for the Hyperwallet REST API.
///
/// Holds immutable configuration and a shared transport, so clones are cheap
/// and can be used from several threads.
#[derive(Debug, Clone)]
pub struct Hyperwallet {
    api: ApiClient,
}

impl Hyperwallet {
    /// `server` defaults to the sandbox when `None`.
    pub fn new(
        username: &str,
        password: &str,
        program_token: Option<&str>,
        server: Option<&str>,
    ) -> Result<Self> {
        let mut config = Config::new(username, password)?;
        if let Some(program_token) = program_token {
            config = config.with_program_token(program_token);
        }
        if let Some(server) = server {
            config = config.with_server(server);
        }
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            api: ApiClient::new(config, transport),
        }
    }

    pub fn config(&self) -> &Config {
        self.api.config()
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Create a user. A user without a program token (or with an empty one)
    /// gets the configured default written into `user` before the request is
    /// sent.
    pub fn create_user(&self, user: &mut User) -> Result<User> {
        if user.program_token.as_deref().map_or(true, str::is_empty) {
            user.program_token = self.config().program_token().map(str::to_string);
        }
        let body = self.api.do_post(USERS, &[], &*user, &no_query())?;
        User::from_properties(body)
    }

    pub fn get_user(&self, user_token: &str) -> Result<User> {
        require(user_token, "userToken")?;
        let body = self
            .api
            .do_get(USER, &[("user-token", user_token)], &no_query())?;
        User::from_properties(body)
    }

    pub fn update_user(&self, user: &User) -> Result<User> {
        let token = require_token(user)?;
        let body = self
            .api
            .do_put(USER, &[("user-token", token)], user, &no_query())?;
        User::from_properties(body)
    }

    pub fn list_users(&self, options: &QueryParams) -> Result<ListResponse<User>> {
        let body = self.api.do_get(USERS, &[], options)?;
        ListResponse::from_properties(body)
    }

    // -----------------------------------------------------------------------
    // Prepaid cards
    // -----------------------------------------------------------------------

    pub fn create_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card: &PrepaidCard,
    ) -> Result<PrepaidCard> {
        require(user_token, "userToken")?;
        let body = self.api.do_post(
            PREPAID_CARDS,
            &[("user-token", user_token)],
            prepaid_card,
            &no_query(),
        )?;
        PrepaidCard::from_properties(body)
    }

    pub fn get_prepaid_card(&self, user_token: &str, prepaid_card_token: &str) -> Result<PrepaidCard> {
        require(user_token, "userToken")?;
        require(prepaid_card_token, "prepaidCardToken")?;
        let body = self.api.do_get(
            PREPAID_CARD,
            &[
                ("user-token", user_token),
                ("prepaid-card-token", prepaid_card_token),
            ],
            &no_query(),
        )?;
        PrepaidCard::from_properties(body)
    }

    /// The card is addressed by `prepaid_card.token`.
    pub fn update_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card: &PrepaidCard,
    ) -> Result<PrepaidCard> {
        require(user_token, "userToken")?;
        let token = require_token(prepaid_card)?;
        let body = self.api.do_put(
            PREPAID_CARD,
            &[("user-token", user_token), ("prepaid-card-token", token)],
            prepaid_card,
            &no_query(),
        )?;
        PrepaidCard::from_properties(body)
    }

    pub fn list_prepaid_cards(
        &self,
        user_token: &str,
        options: &QueryParams,
    ) -> Result<ListResponse<PrepaidCard>> {
        require(user_token, "userToken")?;
        let body = self
            .api
            .do_get(PREPAID_CARDS, &[("user-token", user_token)], options)?;
        ListResponse::from_properties(body)
    }

    pub fn suspend_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::Suspended)
    }

    pub fn unsuspend_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::Unsuspended)
    }

    pub fn lost_or_stolen_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::LostOrStolen)
    }

    pub fn deactivate_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::DeActivated)
    }

    pub fn lock_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::Locked)
    }

    pub fn unlock_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
    ) -> Result<StatusTransition> {
        self.transition_prepaid_card(user_token, prepaid_card_token, Transition::Unlocked)
    }

    fn transition_prepaid_card(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
        transition: Transition,
    ) -> Result<StatusTransition> {
        let status_transition = StatusTransition::new(transition);
        self.create_prepaid_card_status_transition(user_token, prepaid_card_token, &status_transition)
    }

    pub fn create_prepaid_card_status_transition(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
        status_transition: &StatusTransition,
    ) -> Result<StatusTransition> {
        require(user_token, "userToken")?;
        require(prepaid_card_token, "prepaidCardToken")?;
        let body = self.api.do_post(
            PREPAID_CARD_TRANSITIONS,
            &[
                ("user-token", user_token),
                ("prepaid-card-token", prepaid_card_token),
            ],
            status_transition,
            &no_query(),
        )?;
        StatusTransition::from_properties(body)
    }

    pub fn get_prepaid_card_status_transition(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
        status_transition_token: &str,
    ) -> Result<StatusTransition> {
        require(user_token, "userToken")?;
        require(prepaid_card_token, "prepaidCardToken")?;
        require(status_transition_token, "statusTransitionToken")?;
        let body = self.api.do_get(
            PREPAID_CARD_TRANSITION,
            &[
                ("user-token", user_token),
                ("prepaid-card-token", prepaid_card_token),
                ("status-transition-token", status_transition_token),
            ],
            &no_query(),
        )?;
        StatusTransition::from_properties(body)
    }

    pub fn list_prepaid_card_status_transitions(
        &self,
        user_token: &str,
        prepaid_card_token: &str,
        options: &QueryParams,
    ) -> Result<ListResponse<StatusTransition>> {
        require(user_token, "userToken")?;
        require(prepaid_card_token, "prepaidCardToken")?;
        let body = self.api.do_get(
            PREPAID_CARD_TRANSITIONS,
            &[
                ("user-token", user_token),
                ("prepaid-card-token", prepaid_card_token),
            ],
            options,
        )?;
        ListResponse::from_properties(body)
    }

    // -----------------------------------------------------------------------
    // Bank accounts
    // -----------------------------------------------------------------------

    pub fn create_bank_account(
        &self,
        user_token: &str,
        bank_account: &BankAccount,
    ) -> Result<BankAccount> {
        require(user_token, "userToken")?;
        let body = self.api.do_post(
            BANK_ACCOUNTS,
            &[("user-token", user_token)],
            bank_account,
            &no_query(),
        )?;
        BankAccount::from_properties(body)
    }

    pub fn get_bank_account(&self, user_token: &str, bank_account_token: &str) -> Result<BankAccount> {
        require(user_token, "userToken")?;
        require(bank_account_token, "bankAccountToken")?;
        let body = self.api.do_get(
            BANK_ACCOUNT,
            &[
                ("user-token", user_token),
                ("bank-account-token", bank_account_token),
            ],
            &no_query(),
        )?;
        BankAccount::from_properties(body)
    }

    /// The account is addressed by `bank_account.token`.
    pub fn update_bank_account(
        &self,
        user_token: &str,
        bank_account: &BankAccount,
    ) -> Result<BankAccount> {
        require(user_token, "userToken")?;
        let token = require_token(bank_account)?;
        let body = self.api.do_put(
            BANK_ACCOUNT,
            &[("user-token", user_token), ("bank-account-token", token)],
            bank_account,
            &no_query(),
        )?;
        BankAccount::from_properties(body)
    }

    pub fn list_bank_accounts(
        &self,
        user_token: &str,
        options: &QueryParams,
    ) -> Result<ListResponse<BankAccount>> {
        require(user_token, "userToken")?;
        let body = self
            .api
            .do_get(BANK_ACCOUNTS, &[("user-token", user_token)], options)?;
        ListResponse::from_properties(body)
    }

    pub fn deactivate_bank_account(
        &self,
        user_token: &str,
        bank_account_token: &str,
    ) -> Result<StatusTransition> {
        let status_transition = StatusTransition::new(Transition::DeActivated);
        self.create_bank_account_status_transition(user_token, bank_account_token, &status_transition)
    }

    pub fn create_bank_account_status_transition(
        &self,
        user_token: &str,
        bank_account_token: &str,
        status_transition: &StatusTransition,
    ) -> Result<StatusTransition> {
        require(user_token, "userToken")?;
        require(bank_account_token, "bankAccountToken")?;
        let body = self.api.do_post(
            BANK_ACCOUNT_TRANSITIONS,
            &[
                ("user-token", user_token),
                ("bank-account-token", bank_account_token),
            ],
            status_transition,
            &no_query(),
        )?;
        StatusTransition::from_properties(body)
    }

    pub fn get_bank_account_status_transition(
        &self,
        user_token: &str,
        bank_account_token: &str,
        status_transition_token: &str,
    ) -> Result<StatusTransition> {
        require(user_token, "userToken")?;
        require(bank_account_token, "bankAccountToken")?;
        require(status_transition_token, "statusTransitionToken")?;
        let body = self.api.do_get(
            BANK_ACCOUNT_TRANSITION,
            &[
                ("user-token", user_token),
                ("bank-account-token", bank_account_token),
                ("status-transition-token", status_transition_token),
            ],
            &no_query(),
        )?;
        StatusTransition::from_properties(body)
    }

    pub fn list_bank_account_status_transitions(
        &self,
        user_token: &str,
        bank_account_token: &str,
        options: &QueryParams,
    ) -> Result<ListResponse<StatusTransition>> {
        require(user_token, "userToken")?;
        require(bank_account_token, "bankAccountToken")?;
        let body = self.api.do_get(
            BANK_ACCOUNT_TRANSITIONS,
            &[
                ("user-token", user_token),
                ("bank-account-token", bank_account_token),
            ],
            options,
        )?;
        ListResponse::from_properties(body)
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    /// Create a payment, defaulting its program token like `create_user`.
    pub fn create_payment(&self, payment: &mut Payment) -> Result<Payment> {
        if payment.program_token.as_deref().map_or(true, str::is_empty) {
            payment.program_token = self.config().program_token().map(str::to_string);
        }
        let body = self.api.do_post(PAYMENTS, &[], &*payment, &no_query())?;
        Payment::from_properties(body)
    }

    pub fn get_payment(&self, payment_token: &str) -> Result<Payment> {
        require(payment_token, "paymentToken")?;
        let body = self
            .api
            .do_get(PAYMENT, &[("payment-token", payment_token)], &no_query())?;
        Payment::from_properties(body)
    }

    pub fn list_payments(&self, options: &QueryParams) -> Result<ListResponse<Payment>> {
        let body = self.api.do_get(PAYMENTS, &[], options)?;
        ListResponse::from_properties(body)
    }

    // -----------------------------------------------------------------------
    // Programs
    // -----------------------------------------------------------------------

    pub fn get_program(&self, program_token: &str) -> Result<Program> {
        require(program_token, "programToken")?;
        let body = self
            .api
            .do_get(PROGRAM, &[("program-token", program_token)], &no_query())?;
        Program::from_properties(body)
    }
}

fn no_query() -> QueryParams {
    QueryParams::new()
}

fn require(value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        return Err(HyperwalletError::required(name));
    }
    Ok(())
}

/// The entity's own token, required by update operations.
fn require_token<R: Resource>(resource: &R) -> Result<&str> {
    match resource.token() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(HyperwalletError::required("token")),
    }
}
