use anyhow::Result;
use diesel::{RunQueryDsl, sql_query};
use tracing::info;

use super::postgres_connection::PgPoolSquad;

/// Idempotent DDL run at every startup: create-if-missing tables, then the
/// guarded column adds that older deployments are still missing.
const DDL: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS pgcrypto",
    "CREATE TABLE IF NOT EXISTS inscricoes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        full_name TEXT NOT NULL,
        gender TEXT NOT NULL,
        birth_date DATE NOT NULL,
        whatsapp TEXT NOT NULL,
        emergency_contact TEXT NOT NULL,
        address TEXT NOT NULL,
        quote TEXT NOT NULL,
        guardian_name TEXT,
        cpf TEXT NOT NULL,
        document_blob BYTEA NOT NULL,
        document_mime TEXT NOT NULL,
        photo_blob BYTEA NOT NULL,
        photo_mime TEXT NOT NULL,
        devotion_photo_blob BYTEA NOT NULL,
        devotion_photo_mime TEXT NOT NULL,
        payment_id TEXT,
        qr_code TEXT,
        qr_base64 TEXT,
        ticket_url TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        paid_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "ALTER TABLE inscricoes ADD COLUMN IF NOT EXISTS ticket_url TEXT",
    "ALTER TABLE inscricoes ADD COLUMN IF NOT EXISTS status TEXT NOT NULL DEFAULT 'pending'",
    "ALTER TABLE inscricoes ADD COLUMN IF NOT EXISTS paid_at TIMESTAMPTZ",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_inscricoes_cpf ON inscricoes (cpf)",
    "CREATE INDEX IF NOT EXISTS idx_inscricoes_payment_id ON inscricoes (payment_id)",
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        cpf TEXT NOT NULL,
        city TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_users_email ON users (email)",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_users_cpf ON users (cpf)",
    "CREATE TABLE IF NOT EXISTS cart_items (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        product_id TEXT NOT NULL,
        name TEXT NOT NULL,
        size TEXT NOT NULL,
        qty INTEGER NOT NULL,
        price_minor INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_cart_items_user_product_size
        ON cart_items (user_id, product_id, size)",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        total_minor BIGINT NOT NULL,
        payment_id TEXT,
        qr_code TEXT,
        qr_base64 TEXT,
        ticket_url TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        paid_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_orders_payment_id ON orders (payment_id)",
    "CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id TEXT NOT NULL,
        name TEXT NOT NULL,
        size TEXT NOT NULL,
        qty INTEGER NOT NULL,
        price_minor INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS donations (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        donor_name TEXT NOT NULL,
        contact TEXT NOT NULL,
        amount_minor BIGINT NOT NULL,
        payment_id TEXT,
        qr_code TEXT,
        qr_base64 TEXT,
        ticket_url TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        paid_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_donations_payment_id ON donations (payment_id)",
    "CREATE TABLE IF NOT EXISTS admins (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_admins_email ON admins (email)",
];

pub fn ensure_schema(pool: &PgPoolSquad) -> Result<()> {
    let mut conn = pool.get()?;
    for statement in DDL {
        sql_query(*statement).execute(&mut conn)?;
    }
    info!(statements = DDL.len(), "schema_setup: DDL applied");
    Ok(())
}
