//! Configuration tree mapping, lookup and persistence.

use std::str::FromStr;
use std::sync::Arc;

use appserver::node::{
    map, unmap, ConfigNode, HasParams, HasRewrites, ParamValue, SystemConfiguration,
};
use appserver::registry::{AppRegistry, ApplicationInfo};
use appserver::store::{load_configuration, ConfigurationStore, TomlFileSink};
use uuid::Uuid;

mod common;

#[test]
fn test_mapping_is_idempotent_through_unmap() {
    let first: SystemConfiguration = map(&common::sample_document()).unwrap();
    let second: SystemConfiguration = map(&unmap(&first)).unwrap();
    let third: SystemConfiguration = map(&unmap(&second)).unwrap();

    assert_eq!(second, first);
    assert_eq!(third, first);
    assert_eq!(unmap(&third), unmap(&first));
}

#[test]
fn test_sample_document_shape() {
    let tree: SystemConfiguration = map(&common::sample_document()).unwrap();

    let server = tree.server("http").unwrap();
    assert_eq!(server.get_param("port"), Some(&ParamValue::Integer(9080)));
    assert_eq!(server.modules()[0].module_type(), "RewriteModule");

    let shop = server.virtual_host("shop.local").unwrap();
    assert_eq!(
        shop.get_param("documentRoot"),
        Some(&ParamValue::String("webapps/shop".into()))
    );
    assert_eq!(shop.get_rewrite("^/(.*)$").unwrap().target(), "/index.php/$1");
    let effective: Vec<_> = shop.effective_rewrites().iter().map(|r| r.target()).collect();
    assert_eq!(effective, vec!["/assets/$1.css", "/legacy.php/$1"]);
    assert!(server.virtual_host("blog.local").unwrap().get_rewrite("^/(.*)$").is_none());
}

#[test]
fn test_find_all_matches_tree() {
    let tree: SystemConfiguration = map(&common::sample_document()).unwrap();
    let app_count = tree.apps().len();
    let registry = AppRegistry::new(Arc::new(ConfigurationStore::new(tree)));

    let all = registry.find_all();
    assert_eq!(all.len(), app_count);
    for (key, app) in &all {
        assert_eq!(*key, app.primary_key());
    }

    let shop_key = Uuid::from_str(common::SHOP_UUID).unwrap();
    let by_name = registry.find_all_by_name("shop");
    assert_eq!(by_name.keys().copied().collect::<Vec<_>>(), vec![shop_key]);
    assert!(by_name.iter().all(|(key, app)| all.get(key) == Some(app)));
    assert!(registry.find_all_by_name("unknown").is_empty());

    assert_eq!(registry.load(shop_key).unwrap().name(), "shop");
    assert_eq!(
        registry.load_by_webapp_path("/opt/appserver/webapps/blog").unwrap().name(),
        "blog"
    );
}

#[test]
fn test_persist_then_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appserver.toml");
    let tree: SystemConfiguration = map(&common::sample_document()).unwrap();

    let store = Arc::new(ConfigurationStore::with_sink(tree, TomlFileSink::new(&path)));
    let registry = AppRegistry::new(Arc::clone(&store));

    let app = registry.create(&ApplicationInfo::new("crm", "/opt/appserver/webapps/crm"));
    registry.persist(&app).unwrap();

    assert_eq!(registry.load(app.primary_key()), Some(app.clone()));

    let reloaded = load_configuration(&path).unwrap();
    assert_eq!(reloaded, *store.get_configuration());
    assert_eq!(reloaded.apps().len(), 3);
    assert_eq!(reloaded.apps()[2], app);
}

#[test]
fn test_shipped_configuration_loads() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let settings = appserver::config::load_settings(&root.join("etc/settings.toml")).unwrap();
    let tree = load_configuration(&root.join(&settings.configuration_file)).unwrap();

    assert!(tree.apps().is_empty());
    let host = tree.server("http").unwrap().virtual_host("localhost").unwrap();
    assert_eq!(host.get_rewrite("^/(.*)$").unwrap().flag(), "L");
}
