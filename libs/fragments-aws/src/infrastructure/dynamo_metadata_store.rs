//! DynamoDB metadata store
//!
//! One item per fragment, partition key `ownerId`, sort key `id`. Listing an
//! owner is a paginated `Query` on the partition key. Items read back are
//! rebuilt through the domain constructor so a corrupt row can never produce
//! an invalid `Fragment`.

use std::collections::HashMap;

use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use chrono::{DateTime, SecondsFormat, Utc};
use fragments_domain::{
    Fragment, FragmentError, FragmentId, FragmentListing, FragmentView, OwnerId, Result,
};
use tracing::{debug, error, info};

type Item = HashMap<String, AttributeValue>;

const OWNER_ID: &str = "ownerId";
const ID: &str = "id";
const CREATED: &str = "created";
const UPDATED: &str = "updated";
const TYPE: &str = "type";
const SIZE: &str = "size";

/// Metadata tier of the durable backend
#[derive(Clone, Debug)]
pub struct DynamoMetadataStore {
    client: Client,
    table: String,
}

impl DynamoMetadataStore {
    pub fn new(client: Client, table: String) -> Self {
        info!(table = %table, "Initializing DynamoMetadataStore");
        Self { client, table }
    }

    /// Get the table name
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn put(&self, fragment: &Fragment) -> Result<()> {
        debug!(table = %self.table, "Writing fragment metadata to DynamoDB");

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(fragment)))
            .send()
            .await
            .map_err(|err| {
                error!(error = %DisplayErrorContext(&err), "Failed to write fragment metadata");
                FragmentError::backend(format!(
                    "DynamoDB put_item failed for fragment '{}': {}",
                    fragment.id(),
                    DisplayErrorContext(&err)
                ))
            })?;

        info!(fragment_id = %fragment.id(), "Wrote fragment metadata to DynamoDB");
        Ok(())
    }

    pub async fn get(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Fragment> {
        debug!(table = %self.table, "Reading fragment metadata from DynamoDB");

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(key(owner_id, id)))
            .send()
            .await
            .map_err(|err| {
                error!(error = %DisplayErrorContext(&err), "Failed to read fragment metadata");
                FragmentError::backend(format!(
                    "DynamoDB get_item failed for fragment '{}': {}",
                    id,
                    DisplayErrorContext(&err)
                ))
            })?;

        match output.item {
            Some(item) => from_item(&item),
            None => Err(FragmentError::not_found(id.to_string())),
        }
    }

    /// Query every item of an owner, following pagination to the end
    pub async fn list(&self, owner_id: &OwnerId, expand: bool) -> Result<FragmentListing> {
        debug!(table = %self.table, expand, "Querying fragment metadata from DynamoDB");

        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("#owner = :owner")
                .expression_attribute_names("#owner", OWNER_ID)
                .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()))
                .set_exclusive_start_key(start_key.take());
            if !expand {
                query = query
                    .projection_expression("#id")
                    .expression_attribute_names("#id", ID);
            }

            let output = query.send().await.map_err(|err| {
                error!(error = %DisplayErrorContext(&err), "Failed to query fragment metadata");
                FragmentError::backend(format!(
                    "DynamoDB query failed for owner '{}': {}",
                    owner_id,
                    DisplayErrorContext(&err)
                ))
            })?;

            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(count = items.len(), "Queried fragment metadata");
        if expand {
            let fragments = items.iter().map(from_item).collect::<Result<Vec<_>>>()?;
            Ok(FragmentListing::Expanded(fragments))
        } else {
            let ids = items
                .iter()
                .map(|item| string_attr(item, ID).and_then(FragmentId::parse))
                .collect::<Result<Vec<_>>>()?;
            Ok(FragmentListing::Ids(ids))
        }
    }

    /// Delete an item; DynamoDB treats a missing key as success
    pub async fn delete(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        debug!(table = %self.table, "Deleting fragment metadata from DynamoDB");

        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(key(owner_id, id)))
            .send()
            .await
            .map_err(|err| {
                error!(error = %DisplayErrorContext(&err), "Failed to delete fragment metadata");
                FragmentError::backend(format!(
                    "DynamoDB delete_item failed for fragment '{}': {}",
                    id,
                    DisplayErrorContext(&err)
                ))
            })?;

        info!(fragment_id = %id, "Deleted fragment metadata from DynamoDB");
        Ok(())
    }
}

fn key(owner_id: &OwnerId, id: &FragmentId) -> Item {
    HashMap::from([
        (OWNER_ID.to_string(), AttributeValue::S(owner_id.to_string())),
        (ID.to_string(), AttributeValue::S(id.to_string())),
    ])
}

/// Timestamps are stored the way JavaScript's `toISOString` prints them
fn timestamp(value: &DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub(crate) fn to_item(fragment: &Fragment) -> Item {
    let mut item = key(fragment.owner_id(), fragment.id());
    item.insert(CREATED.to_string(), timestamp(fragment.created()));
    item.insert(UPDATED.to_string(), timestamp(fragment.updated()));
    item.insert(
        TYPE.to_string(),
        AttributeValue::S(fragment.content_type().to_string()),
    );
    item.insert(SIZE.to_string(), AttributeValue::N(fragment.size().to_string()));
    item
}

pub(crate) fn from_item(item: &Item) -> Result<Fragment> {
    let view = FragmentView {
        id: FragmentId::parse(string_attr(item, ID)?)?,
        owner_id: OwnerId::parse(string_attr(item, OWNER_ID)?)?,
        created: time_attr(item, CREATED)?,
        updated: time_attr(item, UPDATED)?,
        content_type: string_attr(item, TYPE)?,
        size: size_attr(item)?,
    };
    Fragment::try_from(view)
        .map_err(|err| FragmentError::backend(format!("invalid metadata record: {err}")))
}

fn corrupt(name: &str, problem: &str) -> FragmentError {
    FragmentError::backend(format!("metadata attribute '{name}' {problem}"))
}

fn string_attr(item: &Item, name: &str) -> Result<String> {
    item.get(name)
        .ok_or_else(|| corrupt(name, "is missing"))?
        .as_s()
        .map(|value| value.to_string())
        .map_err(|_| corrupt(name, "is not a string"))
}

fn time_attr(item: &Item, name: &str) -> Result<DateTime<Utc>> {
    let raw = string_attr(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|_| corrupt(name, "is not an RFC 3339 timestamp"))
}

fn size_attr(item: &Item) -> Result<u64> {
    item.get(SIZE)
        .ok_or_else(|| corrupt(SIZE, "is missing"))?
        .as_n()
        .map_err(|_| corrupt(SIZE, "is not a number"))?
        .parse::<u64>()
        .map_err(|_| corrupt(SIZE, "is not a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragments_domain::fragment::NewFragment;

    fn fragment() -> Fragment {
        Fragment::new(OwnerId::parse("owner").unwrap(), "text/plain; charset=utf-8").unwrap()
    }

    #[test]
    fn test_item_attributes() {
        let fragment = fragment();
        let item = to_item(&fragment);

        assert_eq!(item[OWNER_ID], AttributeValue::S("owner".to_string()));
        assert_eq!(item[ID], AttributeValue::S(fragment.id().to_string()));
        assert_eq!(
            item[TYPE],
            AttributeValue::S("text/plain; charset=utf-8".to_string())
        );
        assert_eq!(item[SIZE], AttributeValue::N("0".to_string()));

        let created = item[CREATED].as_s().unwrap();
        assert!(created.ends_with('Z'));
    }

    #[test]
    fn test_item_reads_back_to_same_fragment() {
        let fragment = fragment();
        let restored = from_item(&to_item(&fragment)).unwrap();

        assert_eq!(restored.view(), fragment.view());
    }

    #[test]
    fn test_nanosecond_timestamps_read_back_unchanged() {
        let time = DateTime::parse_from_rfc3339("2026-10-19T10:49:44.030408068Z")
            .unwrap()
            .with_timezone(&Utc);
        let fragment = Fragment::construct(NewFragment {
            owner_id: Some(OwnerId::parse("owner").unwrap()),
            created: Some(time),
            updated: Some(time),
            content_type: Some("text/plain".to_string()),
            size: 7,
            ..NewFragment::default()
        })
        .unwrap();

        let restored = from_item(&to_item(&fragment)).unwrap();
        assert_eq!(restored.view(), fragment.view());
        assert_eq!(to_item(&fragment)[CREATED].as_s().unwrap(), "2026-10-19T10:49:44.030Z");
    }

    #[test]
    fn test_negative_size_is_rejected() {
        let mut item = to_item(&fragment());
        item.insert(SIZE.to_string(), AttributeValue::N("-1".to_string()));

        assert!(matches!(from_item(&item), Err(FragmentError::Backend(_))));
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let mut item = to_item(&fragment());
        item.insert(TYPE.to_string(), AttributeValue::S("image/png".to_string()));

        assert!(matches!(from_item(&item), Err(FragmentError::Backend(_))));
    }

    #[test]
    fn test_missing_attribute_is_rejected() {
        let mut item = to_item(&fragment());
        item.remove(UPDATED);

        assert!(matches!(from_item(&item), Err(FragmentError::Backend(_))));
    }
}
