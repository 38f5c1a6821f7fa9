//! The "Mercado" group: CRUD on the root market resource.

use mercado_core::{FieldKind, Fixture, Group, Schema, StatusCode};
use serde_json::json;

/// Result kinds this group binds. Setup creates one market; every case
/// addresses it through this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Mercado,
}

/// Structural contract of a market body returned by the service.
pub fn mercado_schema() -> Schema {
    Schema::object()
        .field("cnpj", FieldKind::Str)
        .field("endereco", FieldKind::Str)
        .field("id", FieldKind::Int)
        .field("nome", FieldKind::Str)
}

pub fn group() -> Group<Key> {
    Group::new("Mercado")
        .setup(|http, ctx| {
            Box::pin(async move {
                let mut fx = Fixture::new();
                let mercado = http
                    .post("/mercado")
                    .json(&json!({
                        "nome": fx.alphanumeric(56),
                        "cnpj": fx.numeric(14),
                        "endereco": fx.street_address(),
                    }))
                    .send()
                    .await?
                    .expect_status(StatusCode::CREATED)?
                    .capture()?;
                ctx.bind(Key::Mercado, mercado);
                Ok(())
            })
        })
        .case("Cadastro de mercado", |http, _ctx| {
            Box::pin(async move {
                let mut fx = Fixture::new();
                http.post("/mercado")
                    .json(&json!({
                        "nome": fx.alphanumeric(50),
                        "cnpj": fx.numeric(14),
                        "endereco": fx.street_address(),
                    }))
                    .send()
                    .await?
                    .expect_status(StatusCode::CREATED)?;
                Ok(())
            })
        })
        .case("Buscar um mercado por id", |http, ctx| {
            Box::pin(async move {
                let id = ctx.resolve(Key::Mercado)?.id()?;
                http.get(format!("/mercado/{id}"))
                    .send()
                    .await?
                    .expect_status(StatusCode::OK)?
                    .expect_schema(&mercado_schema())?;
                Ok(())
            })
        })
        .case("Deletar um mercado", |http, ctx| {
            Box::pin(async move {
                let id = ctx.resolve(Key::Mercado)?.id()?;
                http.delete(format!("/mercado/{id}"))
                    .send()
                    .await?
                    .expect_status(StatusCode::OK)?;
                Ok(())
            })
        })
}
