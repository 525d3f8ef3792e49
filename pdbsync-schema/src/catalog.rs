//! The validated set of entity types and the schema backing them.

use crate::column::Column as C;
use crate::entity::EntityType;
use crate::schema::{Index, Schema};
use crate::table::Table;
use crate::{SchemaError, SchemaResult};
use std::collections::HashSet;

const ORG: &str = "peeringdb_organization";
const CAMPUS: &str = "peeringdb_campus";
const FAC: &str = "peeringdb_facility";
const CARRIER: &str = "peeringdb_carrier";
const CARRIER_FAC: &str = "peeringdb_carrier_facility";
const NET: &str = "peeringdb_network";
const IX: &str = "peeringdb_ix";
const IX_FAC: &str = "peeringdb_ix_facility";
const IXLAN: &str = "peeringdb_ixlan";
const IX_PREFIX: &str = "peeringdb_ix_prefix";
const NET_CONTACT: &str = "peeringdb_network_contact";
const NET_FAC: &str = "peeringdb_network_facility";
const NET_IXLAN: &str = "peeringdb_network_ixlan";

/// Columns every synchronized table carries right after `id`.
fn record_columns() -> Vec<C> {
    vec![
        C::id(),
        C::datetime("created"),
        C::datetime("updated"),
        C::varchar("status", 255),
    ]
}

fn table(name: &str, columns: Vec<C>) -> Table {
    let mut all = record_columns();
    all.extend(columns);
    Table::new(name, all)
}

/// Entity types plus the schema their tables live in.
#[derive(Debug, Clone)]
pub struct Catalog {
    schema: Schema,
    entities: Vec<EntityType>,
}

impl Catalog {
    /// Builds a catalog, checking that every entity type has a table with
    /// `id` first and the `updated` and `status` columns the engine reads.
    ///
    /// Dependency names are not checked here; the scheduler validates the
    /// dependency graph as a whole.
    pub fn new(schema: Schema, entities: Vec<EntityType>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(SchemaError::DuplicateEntity(entity.name.clone()));
            }
            let table = schema
                .table(&entity.table)
                .ok_or_else(|| SchemaError::UnknownTable {
                    entity: entity.name.clone(),
                    table: entity.table.clone(),
                })?;
            if table.columns.first().map(|c| c.name.as_str()) != Some("id") {
                return Err(SchemaError::IdNotFirst(table.name.clone()));
            }
            for column in ["updated", "status"] {
                if !table.has_column(column) {
                    return Err(SchemaError::MissingColumn {
                        table: table.name.clone(),
                        column,
                    });
                }
            }
        }
        Ok(Self { schema, entities })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Entity types in declaration order.
    pub fn entities(&self) -> &[EntityType] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// The table backing an entity type. Always present for entity types of
    /// this catalog.
    pub fn table_for(&self, entity: &EntityType) -> Option<&Table> {
        self.schema.table(&entity.table)
    }

    /// `(entity, [depends on...])` pairs in declaration order.
    pub fn dependency_pairs(&self) -> Vec<(&str, Vec<&str>)> {
        self.entities
            .iter()
            .map(|e| {
                (
                    e.name.as_str(),
                    e.depends_on.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// The PeeringDB object model.
    pub fn peeringdb() -> Self {
        let entities = vec![
            EntityType::new("organizations", "Organizations", "org", ORG),
            EntityType::new("campuses", "Campuses", "campus", CAMPUS).depends_on(&["organizations"]),
            EntityType::new("facilities", "Facilities", "fac", FAC)
                .depends_on(&["organizations", "campuses"]),
            EntityType::new("carriers", "Carriers", "carrier", CARRIER)
                .depends_on(&["organizations"]),
            EntityType::new("carrier_facilities", "Carrier Facilities", "carrierfac", CARRIER_FAC)
                .depends_on(&["carriers", "facilities"]),
            EntityType::new("networks", "Networks", "net", NET).depends_on(&["organizations"]),
            EntityType::new("internet_exchanges", "Internet Exchanges", "ix", IX)
                .depends_on(&["organizations"]),
            EntityType::new(
                "internet_exchange_facilities",
                "Internet Exchange Facilities",
                "ixfac",
                IX_FAC,
            )
            .depends_on(&["facilities", "internet_exchanges"]),
            EntityType::new("internet_exchange_lans", "Internet Exchange LANs", "ixlan", IXLAN)
                .depends_on(&["internet_exchanges"]),
            EntityType::new(
                "internet_exchange_prefixes",
                "Internet Exchange Prefixes",
                "ixpfx",
                IX_PREFIX,
            )
            .depends_on(&["internet_exchange_lans"]),
            EntityType::new("network_contacts", "Network Contacts", "poc", NET_CONTACT)
                .depends_on(&["networks"]),
            EntityType::new("network_facilities", "Network Facilities", "netfac", NET_FAC)
                .depends_on(&["networks", "facilities"]),
            EntityType::new(
                "network_internet_exchange_lans",
                "Network Internet Exchange LANs",
                "netixlan",
                NET_IXLAN,
            )
            .depends_on(&["networks", "internet_exchanges", "internet_exchange_lans"]),
        ];

        // The declaration above satisfies every check in `new`.
        Self {
            schema: peeringdb_schema(),
            entities,
        }
    }
}

fn peeringdb_schema() -> Schema {
    let tables = vec![
        table(
            ORG,
            vec![
                C::varchar("name", 255).unique(),
                C::varchar("aka", 255),
                C::varchar("name_long", 255),
                C::varchar("website", 255),
                C::text("social_media"),
                C::text("notes"),
                C::varchar("address1", 255),
                C::varchar("address2", 255),
                C::varchar("city", 255),
                C::varchar("country", 7),
                C::varchar("state", 255),
                C::varchar("zipcode", 48),
                C::varchar("floor", 255),
                C::varchar("suite", 255),
                C::float("latitude").nullable(),
                C::float("longitude").nullable(),
            ],
        ),
        table(
            CAMPUS,
            vec![
                C::varchar("name", 255).unique(),
                C::varchar("name_long", 255),
                C::varchar("aka", 255),
                C::varchar("website", 255),
                C::text("social_media"),
                C::text("notes"),
                C::varchar("city", 255),
                C::varchar("country", 7),
                C::varchar("state", 255),
                C::varchar("zipcode", 48),
                C::reference("org_id", ORG),
            ],
        ),
        table(
            FAC,
            vec![
                C::varchar("name", 255).unique(),
                C::varchar("aka", 255),
                C::varchar("name_long", 255),
                C::varchar("website", 255),
                C::text("social_media"),
                C::varchar("clli", 18),
                C::varchar("rencode", 18),
                C::varchar("npanxx", 21),
                C::text("notes"),
                C::varchar("sales_email", 254),
                C::varchar("sales_phone", 192),
                C::varchar("tech_email", 254),
                C::varchar("tech_phone", 192),
                C::varchar("available_voltage_services", 255).nullable(),
                C::bool("diverse_serving_substations").nullable(),
                C::varchar("property", 27).nullable(),
                C::varchar("region_continent", 255).nullable(),
                C::varchar("status_dashboard", 255).nullable(),
                C::varchar("address1", 255),
                C::varchar("address2", 255),
                C::varchar("city", 255),
                C::varchar("country", 7),
                C::varchar("state", 255),
                C::varchar("zipcode", 48),
                C::varchar("floor", 255),
                C::varchar("suite", 255),
                C::float("latitude").nullable(),
                C::float("longitude").nullable(),
                C::reference("org_id", ORG),
                C::reference("campus_id", CAMPUS).nullable(),
            ],
        ),
        table(
            CARRIER,
            vec![
                C::varchar("name", 255).unique(),
                C::varchar("aka", 255),
                C::varchar("name_long", 255),
                C::varchar("website", 255),
                C::text("social_media").nullable(),
                C::text("notes"),
                C::reference("org_id", ORG),
            ],
        ),
        table(
            CARRIER_FAC,
            vec![
                C::varchar("name", 255).nullable(),
                C::reference("carrier_id", CARRIER),
                C::reference("fac_id", FAC),
            ],
        )
        .with_uniqueness(&["carrier_id", "fac_id"]),
        table(
            NET,
            vec![
                C::varchar("name", 255).unique(),
                C::varchar("aka", 255),
                C::varchar("name_long", 255),
                C::varchar("website", 255),
                C::text("social_media").nullable(),
                C::unsigned("asn").unique(),
                C::varchar("looking_glass", 255),
                C::varchar("route_server", 255),
                C::varchar("irr_as_set", 255),
                C::varchar("info_type", 60),
                C::varchar("info_types", 255).nullable(),
                C::unsigned("info_prefixes4").nullable(),
                C::unsigned("info_prefixes6").nullable(),
                C::varchar("info_traffic", 39),
                C::varchar("info_ratio", 45),
                C::varchar("info_scope", 39),
                C::bool("info_unicast"),
                C::bool("info_multicast"),
                C::bool("info_ipv6"),
                C::bool("info_never_via_route_servers"),
                C::text("notes"),
                C::varchar("policy_url", 255),
                C::varchar("policy_general", 72),
                C::varchar("policy_locations", 72),
                C::bool("policy_ratio"),
                C::varchar("policy_contracts", 36),
                C::bool("allow_ixp_update"),
                C::varchar("status_dashboard", 255).nullable(),
                C::varchar("rir_status", 255).nullable(),
                C::datetime("rir_status_updated").nullable(),
                C::reference("org_id", ORG),
            ],
        ),
        table(
            IX,
            vec![
                C::varchar("name", 64).unique(),
                C::varchar("aka", 255),
                C::varchar("name_long", 255),
                C::varchar("city", 192),
                C::varchar("country", 7),
                C::varchar("region_continent", 255),
                C::varchar("media", 128),
                C::text("notes").nullable(),
                C::bool("proto_unicast"),
                C::bool("proto_multicast"),
                C::bool("proto_ipv6"),
                C::varchar("website", 255),
                C::text("social_media").nullable(),
                C::varchar("url_stats", 255),
                C::varchar("tech_email", 254),
                C::varchar("tech_phone", 192),
                C::varchar("policy_email", 254),
                C::varchar("policy_phone", 192),
                C::varchar("sales_email", 254),
                C::varchar("sales_phone", 192),
                C::unsigned("ixf_net_count"),
                C::datetime("ixf_last_import").nullable(),
                C::datetime("ixf_import_request").nullable(),
                C::varchar("ixf_import_request_status", 255).nullable(),
                C::varchar("service_level", 60),
                C::varchar("terms", 60),
                C::varchar("status_dashboard", 255).nullable(),
                C::reference("org_id", ORG),
            ],
        ),
        table(
            IX_FAC,
            vec![
                C::varchar("name", 255),
                C::varchar("city", 255),
                C::varchar("country", 7),
                C::reference("ix_id", IX),
                C::reference("fac_id", FAC),
            ],
        )
        .with_uniqueness(&["ix_id", "fac_id"]),
        table(
            IXLAN,
            vec![
                C::varchar("name", 255),
                C::text("descr"),
                C::unsigned("mtu").nullable(),
                C::bool("dot1q_support"),
                C::unsigned("rs_asn").nullable(),
                C::varchar("arp_sponge", 17).nullable(),
                C::varchar("ixf_ixp_member_list_url", 255).nullable(),
                C::bool("ixf_ixp_member_list_url_visible").nullable(),
                C::bool("ixf_ixp_import_enabled").nullable(),
                C::reference("ix_id", IX),
            ],
        ),
        table(
            IX_PREFIX,
            vec![
                C::varchar("protocol", 64),
                C::varchar("prefix", 43).unique(),
                C::bool("in_dfz"),
                C::reference("ixlan_id", IXLAN),
            ],
        ),
        table(
            NET_CONTACT,
            vec![
                C::varchar("role", 27),
                C::varchar("visible", 64),
                C::varchar("name", 254),
                C::varchar("phone", 100),
                C::varchar("email", 254),
                C::varchar("url", 255),
                C::reference("net_id", NET),
            ],
        ),
        table(
            NET_FAC,
            vec![
                C::varchar("name", 255),
                C::varchar("city", 255),
                C::varchar("country", 7),
                C::unsigned("local_asn").nullable(),
                C::reference("net_id", NET),
                C::reference("fac_id", FAC),
            ],
        )
        .with_uniqueness(&["net_id", "fac_id", "local_asn"]),
        table(
            NET_IXLAN,
            vec![
                C::varchar("name", 255),
                C::text("notes").nullable(),
                C::unsigned("speed"),
                C::unsigned("asn"),
                C::varchar("ipaddr4", 39).nullable(),
                C::varchar("ipaddr6", 39).nullable(),
                C::bool("is_rs_peer"),
                C::bool("bfd_support"),
                C::bool("operational"),
                C::reference("net_id", NET),
                C::reference("ix_id", IX),
                C::reference("ixlan_id", IXLAN),
                C::reference("net_side_id", FAC).nullable(),
                C::reference("ix_side_id", FAC).nullable(),
            ],
        ),
    ];

    let indexes = [
        (CAMPUS, "org_id"),
        (FAC, "org_id"),
        (FAC, "campus_id"),
        (CARRIER, "org_id"),
        (CARRIER_FAC, "carrier_id"),
        (CARRIER_FAC, "fac_id"),
        (NET_CONTACT, "net_id"),
        (NET, "org_id"),
        (IX, "org_id"),
        (IX_FAC, "ix_id"),
        (IX_FAC, "fac_id"),
        (IXLAN, "ix_id"),
        (IX_PREFIX, "ixlan_id"),
        (NET_FAC, "net_id"),
        (NET_FAC, "fac_id"),
        (NET_IXLAN, "ixlan_id"),
        (NET_IXLAN, "net_id"),
        (NET_IXLAN, "ix_side_id"),
        (NET_IXLAN, "net_side_id"),
    ]
    .into_iter()
    .map(|(table, column)| Index::new(table, column))
    .collect();

    Schema::new(tables, indexes)
}
