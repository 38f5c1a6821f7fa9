//! Product groups: one constructor covers every nested collection
//! (padaria/doces, acougue/bovinos, acougue/suinos, acougue/aves), since the
//! four share the same lifecycle. All paths are derived from the group's own
//! route plus its typed bindings, so a case can never address another
//! collection's identifier.

use mercado_core::{Fixture, Group, StatusCode};
use serde_json::json;

/// Result kinds a product group binds: the market created by setup and the
/// most recently created product of the group's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Mercado,
    Produto,
}

/// Route of a product collection nested under a market.
#[derive(Debug, Clone, Copy)]
pub struct Rota {
    categoria: &'static str,
    subtipo: &'static str,
}

impl Rota {
    pub const fn new(categoria: &'static str, subtipo: &'static str) -> Rota {
        Rota { categoria, subtipo }
    }

    fn collection(&self, mercado_id: i64) -> String {
        format!(
            "/mercado/{mercado_id}/produtos/{}/{}",
            self.categoria, self.subtipo
        )
    }

    fn item(&self, mercado_id: i64, produto_id: i64) -> String {
        format!("{}/{produto_id}", self.collection(mercado_id))
    }
}

fn novo_mercado(fx: &mut Fixture) -> serde_json::Value {
    json!({
        "nome": fx.alpha(15),
        "cnpj": fx.numeric(14),
        "endereco": fx.words(3),
    })
}

fn novo_produto(fx: &mut Fixture) -> serde_json::Value {
    json!({
        "nome": fx.alpha(15),
        "valor": fx.int(15),
    })
}

pub fn group(name: &str, rota: Rota) -> Group<Key> {
    Group::new(name)
        .setup(move |http, ctx| {
            Box::pin(async move {
                let mut fx = Fixture::new();
                let mercado = http
                    .post("/mercado")
                    .json(&novo_mercado(&mut fx))
                    .send()
                    .await?
                    .expect_status(StatusCode::CREATED)?
                    .capture()?;

                let produto = http
                    .post(rota.collection(mercado.id()?))
                    .json(&novo_produto(&mut fx))
                    .send()
                    .await?
                    .expect_status(StatusCode::CREATED)?
                    .capture()?;

                ctx.bind(Key::Mercado, mercado);
                ctx.bind(Key::Produto, produto);
                Ok(())
            })
        })
        .case("Cadastro de produto", move |http, ctx| {
            Box::pin(async move {
                let mut fx = Fixture::new();
                let mercado_id = ctx.resolve(Key::Mercado)?.id()?;
                let produto = http
                    .post(rota.collection(mercado_id))
                    .json(&novo_produto(&mut fx))
                    .send()
                    .await?
                    .expect_status(StatusCode::CREATED)?
                    .capture()?;
                // Latest creation wins; the delete case below targets it.
                ctx.bind(Key::Produto, produto);
                Ok(())
            })
        })
        .case("Buscar todos os produtos", move |http, ctx| {
            Box::pin(async move {
                let mercado_id = ctx.resolve(Key::Mercado)?.id()?;
                http.get(rota.collection(mercado_id))
                    .send()
                    .await?
                    .expect_status(StatusCode::OK)?;
                Ok(())
            })
        })
        .case("Deletar um produto", move |http, ctx| {
            Box::pin(async move {
                let mercado_id = ctx.resolve(Key::Mercado)?.id()?;
                let produto_id = ctx.resolve(Key::Produto)?.id()?;
                http.delete(rota.item(mercado_id, produto_id))
                    .send()
                    .await?
                    .expect_status(StatusCode::OK)?;
                Ok(())
            })
        })
}
