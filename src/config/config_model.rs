#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub payments: PixGatewaySettings,
    pub pricing: Pricing,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PixGatewaySettings {
    pub base_url: String,
    pub access_token: String,
    pub notification_url: Option<String>,
    pub payer_email: String,
}

/// Fixed business amounts: the retreat registration fee and the gateway's
/// fee rate used by the admin net-total views.
#[derive(Debug, Clone)]
pub struct Pricing {
    pub registration_amount_minor: i64,
    pub fee_rate: f64,
}

#[derive(Debug, Clone)]
pub struct SessionSecrets {
    pub user_secret: String,
    pub admin_secret: String,
}
