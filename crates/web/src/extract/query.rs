use crate::error::ParseError;
use crate::value::{Arguments, Value};

/// Decodes an `application/x-www-form-urlencoded` string; repeated keys become a list.
pub fn parse_query(query: &str) -> Result<Arguments, ParseError> {
    if query.is_empty() {
        return Ok(Arguments::new());
    }

    let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(ParseError::invalid_query)?;
    Ok(group_pairs(pairs.into_iter().map(|(name, value)| (name, Value::Str(value)))))
}

/// Collects name/value pairs, turning repeated names into a list in arrival order.
pub(crate) fn group_pairs<I>(pairs: I) -> Arguments
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut args = Arguments::new();

    for (name, value) in pairs {
        let merged = match args.remove(&name) {
            None => value,
            Some(Value::List(mut values)) => {
                values.push(value);
                Value::List(values)
            }
            Some(previous) => Value::List(vec![previous, value]),
        };
        args.insert(name, merged);
    }

    args
}
