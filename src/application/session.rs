use crate::application::auth::AuthGuard;
use crate::application::issuing::CardIssuer;
use crate::application::ledger::Ledger;
use crate::domain::luhn;
use crate::domain::ports::CardRegistryRef;
use crate::error::{Result, TellerError};

pub const MAIN_MENU: &str = "1. Create an account\n2. Log into account\n0. Exit\n";
pub const CARD_MENU: &str =
    "1. Balance\n2. Add income\n3. Do transfer\n4. Close account\n5. Log out\n0. Exit\n";

const WRONG_INPUT: &str = "Input is incorrect. Please try again.\n";
const EXIT_MESSAGE: &str = "Bye!\n";

/// Position inside the interaction state machine.
///
/// One tagged value for the whole session: a sub-flow's transient data (the
/// pending transfer target, the card awaiting its PIN) lives inside the
/// variant and is dropped with it, so abandoning a sub-flow can never leave
/// another one's stage flag stale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    MainMenu,
    LoginAwaitingCard,
    LoginAwaitingPin {
        card_number: String,
    },
    CardMenu,
    DepositAwaitingAmount,
    TransferAwaitingTarget,
    TransferAwaitingAmount {
        target: String,
    },
}

/// The single active user context of one interactive run.
#[derive(Debug, Default)]
pub struct Session {
    /// Card number of the authenticated user, if any.
    pub authenticated: Option<String>,
    pub stage: Stage,
}

/// One reply per input; `shutdown` tells the driving loop to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub shutdown: bool,
}

impl Response {
    fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shutdown: false,
        }
    }

    fn exit() -> Self {
        Self {
            text: EXIT_MESSAGE.to_string(),
            shutdown: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainMenuOption {
    CreateAccount,
    LogIn,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardMenuOption {
    Balance,
    AddIncome,
    DoTransfer,
    CloseAccount,
    LogOut,
    Exit,
}

/// The interaction state machine: validates each raw input's shape for the
/// current menu, routes it to the active sub-flow, and produces exactly one
/// response.
pub struct Teller {
    issuer: CardIssuer,
    guard: AuthGuard,
    ledger: Ledger,
    registry: CardRegistryRef,
    session: Session,
}

impl Teller {
    pub fn new(registry: CardRegistryRef, issuer_prefix: impl Into<String>) -> Self {
        Self {
            issuer: CardIssuer::new(registry.clone(), issuer_prefix),
            guard: AuthGuard::new(registry.clone()),
            ledger: Ledger::new(registry.clone()),
            registry,
            session: Session::default(),
        }
    }

    /// The opening prompt.
    pub fn start(&self) -> String {
        MAIN_MENU.to_string()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle_input(&mut self, input: &str) -> Result<Response> {
        let input = input.trim();
        match self.session.stage.clone() {
            Stage::MainMenu => self.handle_main_menu(input).await,
            Stage::LoginAwaitingCard => self.handle_login_card(input).await,
            Stage::LoginAwaitingPin { card_number } => {
                self.handle_login_pin(&card_number, input).await
            }
            Stage::CardMenu => self.handle_card_menu(input).await,
            Stage::DepositAwaitingAmount => self.handle_deposit_amount(input).await,
            Stage::TransferAwaitingTarget => self.handle_transfer_target(input).await,
            Stage::TransferAwaitingAmount { target } => {
                self.handle_transfer_amount(&target, input).await
            }
        }
    }

    async fn handle_main_menu(&mut self, input: &str) -> Result<Response> {
        let Some(option) = main_menu_option(input) else {
            return Ok(Response::prompt(WRONG_INPUT));
        };
        match option {
            MainMenuOption::CreateAccount => {
                let card = self.issuer.issue().await?;
                let message = format!(
                    "Your card has been created\nYour card number:\n{}\nYour card PIN:\n{}\n",
                    card.number, card.pin
                );
                Ok(self.to_main_menu(&message))
            }
            MainMenuOption::LogIn => {
                self.session.stage = Stage::LoginAwaitingCard;
                Ok(Response::prompt("Enter your card number:\n"))
            }
            MainMenuOption::Exit => Ok(Response::exit()),
        }
    }

    async fn handle_login_card(&mut self, input: &str) -> Result<Response> {
        if !is_digits(input) {
            return Ok(Response::prompt(WRONG_INPUT));
        }
        if !self.registry.card_exists(input).await? {
            return Ok(self.to_main_menu("Wrong card number!"));
        }
        // The lockout check gates the PIN prompt itself.
        if !self.guard.may_attempt_login(input).await? {
            tracing::warn!(number = %input, "login refused, card is blocked");
            return Ok(self.to_main_menu(
                "There were too many failed login attempts. Card is blocked for one hour",
            ));
        }
        self.session.stage = Stage::LoginAwaitingPin {
            card_number: input.to_string(),
        };
        Ok(Response::prompt("Enter your PIN:\n"))
    }

    async fn handle_login_pin(&mut self, card_number: &str, input: &str) -> Result<Response> {
        if !is_digits(input) {
            return Ok(Response::prompt(WRONG_INPUT));
        }
        if self.guard.authorize(card_number, input).await? {
            self.session.authenticated = Some(card_number.to_string());
            Ok(self.to_card_menu("You have successfully logged in!"))
        } else {
            Ok(self.to_main_menu("Wrong PIN!"))
        }
    }

    async fn handle_card_menu(&mut self, input: &str) -> Result<Response> {
        let Some(option) = card_menu_option(input) else {
            return Ok(Response::prompt(WRONG_INPUT));
        };
        let Some(card) = self.session.authenticated.clone() else {
            return Ok(self.to_main_menu(""));
        };
        match option {
            CardMenuOption::Balance => {
                let balance = self.ledger.balance(&card).await?;
                Ok(self.to_card_menu(&format!("Balance: {balance}")))
            }
            CardMenuOption::AddIncome => {
                self.session.stage = Stage::DepositAwaitingAmount;
                Ok(Response::prompt("Enter income:\n"))
            }
            CardMenuOption::DoTransfer => {
                self.session.stage = Stage::TransferAwaitingTarget;
                Ok(Response::prompt("Transfer\nEnter card number:\n"))
            }
            CardMenuOption::CloseAccount => {
                self.ledger.close_account(&card).await?;
                self.session.authenticated = None;
                Ok(self.to_main_menu("The account has been closed!"))
            }
            CardMenuOption::LogOut => {
                self.session.authenticated = None;
                Ok(self.to_main_menu("You have successfully logged out!"))
            }
            CardMenuOption::Exit => Ok(Response::exit()),
        }
    }

    async fn handle_deposit_amount(&mut self, input: &str) -> Result<Response> {
        let Some(amount) = parse_amount(input) else {
            return Ok(Response::prompt(WRONG_INPUT));
        };
        let Some(card) = self.session.authenticated.clone() else {
            return Ok(self.to_main_menu(""));
        };
        match self.ledger.deposit(&card, amount).await {
            Ok(()) => Ok(self.to_card_menu("Income was added!")),
            Err(TellerError::InvalidAmount { .. }) => {
                Ok(self.to_card_menu("Income must be positive!"))
            }
            Err(e) => Err(e),
        }
    }

    async fn handle_transfer_target(&mut self, input: &str) -> Result<Response> {
        if !is_digits(input) {
            return Ok(Response::prompt(WRONG_INPUT));
        }
        let Some(card) = self.session.authenticated.clone() else {
            return Ok(self.to_main_menu(""));
        };
        if !luhn::validate(input) {
            return Ok(self.to_card_menu(
                "Probably you made a mistake in the card number. Please try again!",
            ));
        }
        if input == card {
            return Ok(self.to_card_menu("You can't transfer money to the same account!"));
        }
        if !self.registry.card_exists(input).await? {
            return Ok(self.to_card_menu("Such a card does not exist."));
        }
        self.session.stage = Stage::TransferAwaitingAmount {
            target: input.to_string(),
        };
        Ok(Response::prompt("Enter how much money you want to transfer:\n"))
    }

    async fn handle_transfer_amount(&mut self, target: &str, input: &str) -> Result<Response> {
        let Some(amount) = parse_amount(input) else {
            return Ok(Response::prompt(WRONG_INPUT));
        };
        let Some(card) = self.session.authenticated.clone() else {
            return Ok(self.to_main_menu(""));
        };
        // Returning to the card menu drops the pending target with the stage.
        match self.ledger.transfer(&card, target, amount).await {
            Ok(()) => Ok(self.to_card_menu("Success!")),
            Err(TellerError::InsufficientFunds { .. }) => {
                Ok(self.to_card_menu("Not enough money!"))
            }
            Err(TellerError::InvalidAmount { .. }) => {
                Ok(self.to_card_menu("You can only transfer a positive sum!"))
            }
            Err(TellerError::SameAccountTransfer) => {
                Ok(self.to_card_menu("You can't transfer money to the same account!"))
            }
            Err(e) => Err(e),
        }
    }

    fn to_main_menu(&mut self, message: &str) -> Response {
        self.session.stage = Stage::MainMenu;
        Response::prompt(with_menu(message, MAIN_MENU))
    }

    fn to_card_menu(&mut self, message: &str) -> Response {
        self.session.stage = Stage::CardMenu;
        Response::prompt(with_menu(message, CARD_MENU))
    }
}

fn with_menu(message: &str, menu: &str) -> String {
    if message.is_empty() {
        menu.to_string()
    } else {
        format!("{message}\n{menu}")
    }
}

fn is_digits(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_digit())
}

fn parse_amount(input: &str) -> Option<i64> {
    is_digits(input).then(|| input.parse::<i64>().ok()).flatten()
}

fn main_menu_option(input: &str) -> Option<MainMenuOption> {
    match parse_menu_digit(input, 2)? {
        1 => Some(MainMenuOption::CreateAccount),
        2 => Some(MainMenuOption::LogIn),
        _ => Some(MainMenuOption::Exit),
    }
}

fn card_menu_option(input: &str) -> Option<CardMenuOption> {
    match parse_menu_digit(input, 5)? {
        1 => Some(CardMenuOption::Balance),
        2 => Some(CardMenuOption::AddIncome),
        3 => Some(CardMenuOption::DoTransfer),
        4 => Some(CardMenuOption::CloseAccount),
        5 => Some(CardMenuOption::LogOut),
        _ => Some(CardMenuOption::Exit),
    }
}

fn parse_menu_digit(input: &str, max: u32) -> Option<u32> {
    if !is_digits(input) {
        return None;
    }
    let value = input.parse::<u32>().ok()?;
    (value <= max).then_some(value)
}
