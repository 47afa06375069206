mod test_at_most_once_delivery;
