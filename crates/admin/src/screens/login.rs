use upbreed_client::{AuthGuard, Session, AUTH_COOKIE};
use upbreed_core::models::LoginResponse;
use upbreed_core::routes::Route;
use upbreed_core::validation::{check, FormErrors, LoginForm};
use upbreed_events::Toast;
use upbreed_query::{FetchError, MutateOptions, Mutation, MutationConfig, MutationOutcome};

use crate::app::AdminApp;

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The form failed validation; no request was made.
    Invalid(FormErrors),
    LoggedIn(Session),
    Failed(FetchError),
}

/// Email/password login. A successful login stores the `rf` cookie and
/// lands on the dashboard.
pub struct LoginScreen {
    app: AdminApp,
    pub form: LoginForm,
    errors: FormErrors,
    login: Mutation<LoginForm, LoginResponse>,
}

impl LoginScreen {
    pub fn new(app: AdminApp) -> Self {
        let api = app.api.clone();
        let navigator = app.navigator.clone();
        let config = MutationConfig::new(
            move |form: LoginForm| {
                let api = api.clone();
                async move { api.login(&form.email, &form.password).await }
            },
            Toast::error("Invalid email or password"),
        )
        .success_toast(Toast::success("Logged in successfully"))
        .cookie(AUTH_COOKIE, |r: &LoginResponse| Some(r.token.clone()))
        .on_success(move |_| navigator.navigate(Route::Dashboard));

        Self {
            login: Mutation::new(config, app.mutation_context()),
            app,
            form: LoginForm::default(),
            errors: FormErrors::default(),
        }
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_pending(&self) -> bool {
        self.login.is_pending()
    }

    pub async fn submit(&mut self) -> LoginOutcome {
        if let Err(errors) = check(&self.form) {
            self.errors = errors.clone();
            return LoginOutcome::Invalid(errors);
        }
        self.errors = FormErrors::default();

        match self.login.mutate(self.form.clone(), MutateOptions::default()).await {
            MutationOutcome::Succeeded(_) => match AuthGuard::check(&self.app.jar) {
                Ok(session) => {
                    tracing::info!(email = %self.form.email, "Logged in");
                    LoginOutcome::LoggedIn(session)
                }
                Err(redirect) => {
                    tracing::warn!(to = %redirect.to, "Fresh session rejected by guard");
                    LoginOutcome::Failed(FetchError::new("session token was rejected"))
                }
            },
            MutationOutcome::Failed(e) => LoginOutcome::Failed(e),
        }
    }
}
