use clap::{Args, Subcommand};
use solecart_app::{
    carts::ReconcileOutcome,
    context::AppContext,
    services::{NewAccount, UserProfile},
    session::AuthSessionProvider,
};

#[derive(Debug, Args)]
pub(crate) struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
enum AuthSubcommand {
    /// Sign in, replacing the local cart with your saved one if you have one
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Sign out and empty the local cart
    Logout,

    /// Show who is signed in
    Whoami,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "SOLECART_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    /// Display name
    #[arg(long)]
    username: String,

    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "SOLECART_PASSWORD", hide_env_values = true)]
    password: String,

    /// Postal address
    #[arg(long)]
    address: String,

    /// Phone number
    #[arg(long)]
    phone_number: String,
}

pub(crate) async fn run(context: &AppContext, command: AuthCommand) -> Result<(), String> {
    match command.command {
        AuthSubcommand::Login(args) => login(context, args).await,
        AuthSubcommand::Register(args) => register(context, args).await,
        AuthSubcommand::Logout => logout(context),
        AuthSubcommand::Whoami => {
            whoami(context);
            Ok(())
        }
    }
}

async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    let profile = context
        .session
        .login(&args.email, &args.password)
        .await
        .map_err(|error| format!("login failed: {error}"))?;

    print_profile(&profile);

    let state = context.session.current();

    if let Some(user_id) = state.user_id() {
        match context.cart.reconcile_with_remote(user_id).await {
            ReconcileOutcome::Replaced { lines } => {
                println!("loaded {lines} line(s) from your saved cart");
            }
            ReconcileOutcome::Failed => println!("could not load your saved cart"),
            ReconcileOutcome::KeptLocal | ReconcileOutcome::Stale => {}
        }
    }

    Ok(())
}

async fn register(context: &AppContext, args: RegisterArgs) -> Result<(), String> {
    let account = NewAccount {
        username: args.username,
        email: args.email,
        password: args.password,
        address: args.address,
        phone_number: args.phone_number,
    };

    let profile = context
        .session
        .register(&account)
        .await
        .map_err(|error| format!("registration failed: {error}"))?;

    println!("registered: {}", profile.email);

    if context.session.current().user_id().is_none() {
        println!("sign in with `solecart auth login` to continue");
    }

    Ok(())
}

fn logout(context: &AppContext) -> Result<(), String> {
    context
        .session
        .logout()
        .map_err(|error| format!("logout failed: {error}"))?;

    context
        .cart
        .clear_local_only()
        .map_err(|error| format!("failed to clear cart: {error}"))?;

    println!("signed out");

    Ok(())
}

fn whoami(context: &AppContext) {
    let Some(profile) = context.session.profile() else {
        println!("not signed in");
        return;
    };

    print_profile(&profile);

    if let Some(token) = context.session.token() {
        let tail = token.get(token.len().saturating_sub(4)..).unwrap_or_default();
        println!("token: ****{tail}");
    }
}

fn print_profile(profile: &UserProfile) {
    if let Some(id) = &profile.id {
        println!("user_id: {id}");
    }
    println!("name: {} {}", profile.first_name, profile.last_name);
    println!("email: {}", profile.email);
}
