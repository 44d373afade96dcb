//! Shared fixtures for integration tests.

use std::path::Path;
use std::sync::Arc;

use appserver::deployment::{DeploymentController, DirectoryExtractor};
use appserver::node::{Element, SystemConfiguration};
use appserver::registry::AppRegistry;
use appserver::store::ConfigurationStore;

pub const SHOP_UUID: &str = "3f1c2a9e-52d4-4c7b-9d0e-6a1b8f7c2e11";

/// A configuration document with one server, two virtual hosts and two
/// applications.
pub fn sample_document() -> Element {
    Element::new("appserver")
        .with_child(
            Element::new("apps")
                .with_child(shop_application())
                .with_child(
                    Element::new("application")
                        .with_attribute("name", "blog")
                        .with_attribute("webappPath", "/opt/appserver/webapps/blog"),
                ),
        )
        .with_child(Element::new("servers").with_child(http_server()))
}

fn shop_application() -> Element {
    let database = Element::new("database")
        .with_child(Element::new("driver").with_text("pdo_mysql"))
        .with_child(Element::new("databaseHost").with_text("127.0.0.1"))
        .with_child(Element::new("databasePort").with_text("3306"));
    let datasource = Element::new("datasource")
        .with_attribute("name", "shopDS")
        .with_attribute("type", "mysql")
        .with_child(database);

    Element::new("application")
        .with_attribute("uuid", SHOP_UUID)
        .with_attribute("name", "shop")
        .with_attribute("webappPath", "/opt/appserver/webapps/shop")
        .with_child(Element::new("datasources").with_child(datasource))
}

fn http_server() -> Element {
    let port = Element::new("param")
        .with_attribute("name", "port")
        .with_attribute("type", "integer")
        .with_text("9080");
    let modules = Element::new("modules")
        .with_child(Element::new("module").with_attribute("type", "RewriteModule"))
        .with_child(Element::new("module").with_attribute("type", "CoreModule"));
    let hosts = Element::new("virtualHosts")
        .with_child(shop_host())
        .with_child(Element::new("virtualHost").with_attribute("name", "blog.local"));

    Element::new("server")
        .with_attribute("name", "http")
        .with_attribute("type", "MultiThreadedServer")
        .with_attribute("worker", "ThreadWorker")
        .with_attribute("socket", "StreamSocket")
        .with_attribute("serverContext", "ServerContext")
        .with_child(Element::new("params").with_child(port))
        .with_child(modules)
        .with_child(hosts)
}

fn shop_host() -> Element {
    let document_root = Element::new("param")
        .with_attribute("name", "documentRoot")
        .with_text("webapps/shop");
    let rewrites = Element::new("rewrites")
        .with_child(rewrite("^/(.*)\\.css$", "/assets/$1.css", "L"))
        .with_child(rewrite("^/(.*)$", "/index.php/$1", "L"))
        .with_child(rewrite("^/(.*)$", "/legacy.php/$1", ""));

    Element::new("virtualHost")
        .with_attribute("name", "shop.local")
        .with_child(Element::new("params").with_child(document_root))
        .with_child(rewrites)
}

fn rewrite(condition: &str, target: &str, flag: &str) -> Element {
    Element::new("rewrite")
        .with_attribute("condition", condition)
        .with_attribute("target", target)
        .with_attribute("flag", flag)
}

/// Store, registry and controller over `deploy_dir`.
pub fn deployment(
    tree: SystemConfiguration,
    deploy_dir: &Path,
) -> (AppRegistry, DeploymentController) {
    let store = Arc::new(ConfigurationStore::new(tree));
    let registry = AppRegistry::new(store);
    let extractor = DirectoryExtractor::new(deploy_dir);
    let controller = DeploymentController::new(registry.clone(), extractor);
    (registry, controller)
}
