//! End-to-end suite for the Mercado marketplace API.
//!
//! Five groups mirror the resource families of the remote service: the
//! market root resource and four nested product collections. Each group's
//! setup creates the entities its cases address; entity ids flow from setup
//! into cases through the group's typed bindings.

pub mod mercado;
pub mod produtos;

use mercado_core::Runner;
use produtos::Rota;

/// Register every group of the suite on the runner, in the order the
/// original collections are laid out on the remote service.
pub fn install(runner: &mut Runner) {
    runner.add_group(mercado::group());
    runner.add_group(produtos::group("Doces", Rota::new("padaria", "doces")));
    runner.add_group(produtos::group("Bovinos", Rota::new("acougue", "bovinos")));
    runner.add_group(produtos::group("Suinos", Rota::new("acougue", "suinos")));
    runner.add_group(produtos::group("Aves", Rota::new("acougue", "aves")));
}
