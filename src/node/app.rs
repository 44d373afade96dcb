//! Application and datasource nodes.

use serde::Serialize;
use uuid::Uuid;

use crate::node::mapping::{FieldMapping, Source};
use crate::node::ConfigNode;

/// One deployed application.
///
/// Created by the mapper for applications already in the configuration, or
/// by the application registry for a freshly deployed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppNode {
    primary_key: Uuid,
    name: String,
    webapp_path: String,
    datasources: Vec<DatasourceNode>,
}

impl AppNode {
    /// New application node with a freshly generated primary key.
    pub fn new(
        name: impl Into<String>,
        webapp_path: impl Into<String>,
        datasources: Vec<DatasourceNode>,
    ) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            name: name.into(),
            webapp_path: webapp_path.into(),
            datasources,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn webapp_path(&self) -> &str {
        &self.webapp_path
    }

    pub fn datasources(&self) -> &[DatasourceNode] {
        &self.datasources
    }
}

impl ConfigNode for AppNode {
    const NODE_NAME: &'static str = "application";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            webapp_path: String::new(),
            datasources: Vec::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text("name", Source::Attribute("name"), Self::name, |n: &mut Self, v| {
                n.name = v
            })
            .required(),
            FieldMapping::text(
                "webappPath",
                Source::Attribute("webappPath"),
                Self::webapp_path,
                |n: &mut Self, v| n.webapp_path = v,
            ),
            FieldMapping::collection(
                "datasources",
                "datasources/datasource",
                Self::datasources,
                |n: &mut Self, c| n.datasources.push(c),
            ),
        ]
    }
}

/// Database connection an application depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseSettings {
    pub driver: String,
    pub user: String,
    pub password: String,
    pub database_name: String,
    pub database_host: String,
    pub database_port: Option<i64>,
}

/// A named datasource (`<datasource name=".." type=".."><database>..</database>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasourceNode {
    primary_key: Uuid,
    name: String,
    #[serde(rename = "type")]
    datasource_type: String,
    database: DatabaseSettings,
}

impl DatasourceNode {
    pub fn new(
        name: impl Into<String>,
        datasource_type: impl Into<String>,
        database: DatabaseSettings,
    ) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            name: name.into(),
            datasource_type: datasource_type.into(),
            database,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datasource_type(&self) -> &str {
        &self.datasource_type
    }

    pub fn database(&self) -> &DatabaseSettings {
        &self.database
    }
}

impl ConfigNode for DatasourceNode {
    const NODE_NAME: &'static str = "datasource";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            datasource_type: String::new(),
            database: DatabaseSettings::default(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text("name", Source::Attribute("name"), Self::name, |n: &mut Self, v| {
                n.name = v
            })
            .required(),
            FieldMapping::text(
                "type",
                Source::Attribute("type"),
                Self::datasource_type,
                |n: &mut Self, v| n.datasource_type = v,
            ),
            FieldMapping::text(
                "driver",
                Source::Text("database/driver"),
                |n: &Self| n.database.driver.as_str(),
                |n: &mut Self, v| n.database.driver = v,
            ),
            FieldMapping::text(
                "user",
                Source::Text("database/user"),
                |n: &Self| n.database.user.as_str(),
                |n: &mut Self, v| n.database.user = v,
            ),
            FieldMapping::text(
                "password",
                Source::Text("database/password"),
                |n: &Self| n.database.password.as_str(),
                |n: &mut Self, v| n.database.password = v,
            ),
            FieldMapping::text(
                "databaseName",
                Source::Text("database/databaseName"),
                |n: &Self| n.database.database_name.as_str(),
                |n: &mut Self, v| n.database.database_name = v,
            ),
            FieldMapping::text(
                "databaseHost",
                Source::Text("database/databaseHost"),
                |n: &Self| n.database.database_host.as_str(),
                |n: &mut Self, v| n.database.database_host = v,
            ),
            FieldMapping::integer(
                "databasePort",
                Source::Text("database/databasePort"),
                |n: &Self| n.database.database_port,
                |n: &mut Self, v| n.database.database_port = Some(v),
            ),
        ]
    }
}
